//! Status command

use crate::app::OutputFormat;
use cookcompass_core::Database;
use std::path::Path;

pub async fn run(config_path: Option<&Path>, format: OutputFormat) -> anyhow::Result<()> {
    let config = crate::load_config(config_path)?;
    let store_path = config.store_path();

    let db = Database::open(&store_path)?;
    db.initialize()?;
    let stats = db.get_stats()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Cli => {
            println!("Store:           {}", store_path.display());
            println!("Dataset:         {}", config.dataset_path().display());
            println!();
            println!("Recipes:         {}", stats.recipe_count);
            println!("Embedded:        {}", stats.embedded_count);
            println!("Distinct tags:   {}", stats.distinct_tags);
            println!();
            println!("Embedding model:");
            match (&stats.embedding_model, stats.embedding_dimensions) {
                (Some(model), Some(dims)) => println!("  {} ({} dimensions)", model, dims),
                _ => println!("  none registered"),
            }
            println!("Chat model:      {}", config.llm);
            println!("Retrieval:       {} (top {})", config.retrieval.strategy, config.retrieval.top_k);
        }
    }
    Ok(())
}
