//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use cookcompass_core::config::CONFIG_PATH_ENV;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cookcompass")]
#[command(
    author,
    version,
    about = "Recipe recommendations grounded in your own recipe collection"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings document (defaults to ./config.yaml)
    #[arg(long, global = true, env = CONFIG_PATH_ENV)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat session
    Chat,

    /// Ask a single question
    Ask(AskArgs),

    /// Load the recipe dataset into the store
    Ingest(IngestArgs),

    /// Show store status
    Status,

    /// Similarity search without generation
    Search(SearchArgs),
}

#[derive(Args)]
pub struct AskArgs {
    /// Question text
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Print the search query, keywords and recipes used
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct IngestArgs {
    /// Ingest even when the store already holds recipes
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search text
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Maximum results
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,

    /// Only recipes carrying this tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Show recipe text
    #[arg(long)]
    pub full: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
