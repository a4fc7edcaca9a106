//! Cook Compass CLI
//!
//! Chat with a recipe assistant that answers from your own dataset.

use clap::Parser;
use cookcompass_core::error::exit_codes;
use cookcompass_core::{Config, CookCompassError};
use std::path::Path;

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so streamed answers on stdout stay clean
    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<CookCompassError>()
            .map(CookCompassError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Chat => commands::chat::run(config_path).await,
        Commands::Ask(args) => commands::ask::run(args, config_path, cli.format).await,
        Commands::Ingest(args) => commands::ingest::run(args, config_path).await,
        Commands::Status => commands::status::run(config_path, cli.format).await,
        Commands::Search(args) => commands::search::run(args, config_path, cli.format).await,
    }
}

/// Load settings from `--config`, `COOKCOMPASS_CONFIG` or the default location
pub(crate) fn load_config(path: Option<&Path>) -> cookcompass_core::Result<Config> {
    match path {
        Some(path) => Config::from_path(path),
        None => Config::load(),
    }
}
