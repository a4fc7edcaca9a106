//! CLI command implementations

pub mod ask;
pub mod chat;
pub mod ingest;
pub mod search;
pub mod status;

use crate::progress::ingest_reporter;
use cookcompass_core::{InferenceEngine, Secrets};
use std::path::Path;

/// Build the engine, ingesting the dataset first if the store is empty
pub(crate) async fn open_engine(config_path: Option<&Path>) -> anyhow::Result<InferenceEngine> {
    let secrets = Secrets::from_env()?;
    let config = crate::load_config(config_path)?;
    let engine =
        InferenceEngine::from_config_with_progress(&config, &secrets, Some(ingest_reporter()))
            .await?;
    Ok(engine)
}
