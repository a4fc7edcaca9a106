//! Ingest command

use crate::progress::ingest_reporter;
use cookcompass_core::ingest::{ensure_ingested, ingest_dataset};
use cookcompass_core::{Database, HttpEmbedder, IngestOutcome, IngestStats, Secrets};
use std::path::Path;

pub async fn run(args: crate::app::IngestArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let secrets = Secrets::from_env()?;
    let config = crate::load_config(config_path)?;

    let db = Database::open(config.store_path())?;
    db.initialize()?;
    let embedder = HttpEmbedder::from_config(&config, &secrets)?;

    let stats = if args.force {
        ingest_dataset(&config.dataset_path(), &db, &embedder, Some(ingest_reporter())).await?
    } else {
        match ensure_ingested(&config, &db, &embedder, Some(ingest_reporter())).await? {
            IngestOutcome::AlreadyPopulated(count) => {
                println!(
                    "Store already holds {} recipes; use --force to ingest again",
                    count
                );
                return Ok(());
            }
            IngestOutcome::Ingested(stats) => stats,
        }
    };

    print_stats(&stats);
    Ok(())
}

fn print_stats(stats: &IngestStats) {
    println!("Ingestion complete:");
    println!("  Rows read:     {}", stats.total_rows);
    println!("  Rows skipped:  {}", stats.skipped_rows);
    println!("  Recipes:       {}", stats.documents_written);
    println!("  Batches:       {}", stats.batches);
}
