//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use cookcompass_core::ScoredRecipe;

/// Format search results
pub fn format_recipes(results: &[ScoredRecipe], format: OutputFormat, full: bool) -> String {
    match format {
        OutputFormat::Json => json::format_recipes(results),
        OutputFormat::Cli => terminal::format_recipes(results, full),
    }
}
