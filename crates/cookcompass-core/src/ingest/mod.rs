//! Recipe ingestion
//!
//! Reads the recipe dataset, embeds each recipe and writes it to the store.

mod csv;
mod normalize;

pub use self::csv::{embedding_text, read_recipes, ParsedRecipes};
pub use normalize::{clean_list_string, parse_list_literal, parse_tags};

use crate::config::Config;
use crate::db::DocumentStore;
use crate::error::{CookCompassError, Result};
use crate::llm::Embedder;
use std::path::Path;

const BATCH_SIZE: usize = 32;

/// Ingestion progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestProgress {
    pub total_documents: usize,
    pub embedded_documents: usize,
}

/// Ingestion statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct IngestStats {
    pub total_rows: usize,
    pub skipped_rows: usize,
    pub documents_written: usize,
    pub batches: usize,
}

/// What [`ensure_ingested`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Store already held this many documents; nothing was read
    AlreadyPopulated(usize),
    Ingested(IngestStats),
}

pub type ProgressCallback = Box<dyn Fn(IngestProgress) + Send + Sync>;

/// Embed every recipe in the dataset and write it to the store
pub async fn ingest_dataset(
    dataset: &Path,
    store: &dyn DocumentStore,
    embedder: &dyn Embedder,
    progress: Option<ProgressCallback>,
) -> Result<IngestStats> {
    let parsed = read_recipes(dataset)?;
    let mut stats = IngestStats {
        total_rows: parsed.total_rows,
        skipped_rows: parsed.skipped_rows,
        ..Default::default()
    };

    if parsed.documents.is_empty() {
        tracing::warn!("No documents to index. Ingestion skipped.");
        return Ok(stats);
    }

    let total = parsed.documents.len();
    tracing::info!(
        "Embedding {} recipes with model {} in batches of {}",
        total,
        embedder.model_name(),
        BATCH_SIZE
    );

    // Written in one go after the last batch; a failed run leaves the store empty
    let mut embedded = Vec::with_capacity(total);
    for batch in parsed.documents.chunks(BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|d| d.content.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != batch.len() {
            return Err(CookCompassError::Llm(format!(
                "Embedder returned {} vectors for a batch of {}",
                embeddings.len(),
                batch.len()
            )));
        }

        embedded.extend(
            batch
                .iter()
                .cloned()
                .zip(embeddings)
                .map(|(doc, embedding)| doc.with_embedding(embedding)),
        );
        stats.batches += 1;

        if let Some(ref cb) = progress {
            cb(IngestProgress {
                total_documents: total,
                embedded_documents: embedded.len(),
            });
        }
    }

    let dims = embedded
        .first()
        .and_then(|d| d.embedding.as_ref())
        .map(Vec::len)
        .unwrap_or(0);
    store.register_embedding_model(embedder.model_name(), dims)?;
    stats.documents_written = store.write_documents(&embedded)?;

    tracing::info!(
        "Ingestion finished: {} documents embedded in {} batches and written",
        stats.documents_written,
        stats.batches
    );

    Ok(stats)
}

/// Ingest the configured dataset only when the store is empty
pub async fn ensure_ingested(
    config: &Config,
    store: &dyn DocumentStore,
    embedder: &dyn Embedder,
    progress: Option<ProgressCallback>,
) -> Result<IngestOutcome> {
    let count = store.count_documents()?;
    if count > 0 {
        tracing::debug!("Store holds {} recipes, skipping ingestion", count);
        return Ok(IngestOutcome::AlreadyPopulated(count));
    }

    let dataset = config.dataset_path();
    tracing::info!("Recipe store is empty, ingesting {}", dataset.display());
    let stats = ingest_dataset(&dataset, store, embedder, progress).await?;
    Ok(IngestOutcome::Ingested(stats))
}
