//! Search command

use crate::app::{OutputFormat, SearchArgs};
use crate::output;
use cookcompass_core::{
    ensure_same_model, Database, HttpEmbedder, MetadataFilter, RetrievalStrategy, Retriever,
    Secrets,
};
use std::path::Path;
use std::sync::Arc;

pub async fn run(args: SearchArgs, config_path: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    let secrets = Secrets::from_env()?;
    let config = crate::load_config(config_path)?;

    let db = Database::open(config.store_path())?;
    db.initialize()?;
    if !db.has_vector_index() {
        anyhow::bail!("Recipe store is empty. Run 'cookcompass ingest' first.");
    }

    let embedder = Arc::new(HttpEmbedder::from_config(&config, &secrets)?);
    ensure_same_model(&db, embedder.as_ref())?;
    let retriever = Retriever::new(RetrievalStrategy::Dense, Arc::new(db), embedder, args.limit);

    let filter = (!args.tags.is_empty()).then(|| MetadataFilter::all_tags(args.tags.iter().cloned()));
    let results = retriever
        .retrieve_filtered(&args.query.join(" "), filter.as_ref())
        .await?;

    if results.is_empty() && format == OutputFormat::Cli {
        println!("No results found");
        return Ok(());
    }

    print!("{}", output::format_recipes(&results, format, args.full));
    Ok(())
}
