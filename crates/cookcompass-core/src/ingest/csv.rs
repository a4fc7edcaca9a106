//! Recipe CSV reader

use super::normalize::{clean_list_string, parse_tags};
use crate::db::{RecipeDocument, RecipeMetadata};
use crate::error::{CookCompassError, Result};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;

/// Column positions resolved from the header row
struct Columns {
    id: Option<usize>,
    name: Option<usize>,
    minutes: Option<usize>,
    tags: Option<usize>,
    ingredients: Option<usize>,
    steps: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        Self {
            id: find("id"),
            name: find("name"),
            minutes: find("minutes"),
            tags: find("tags"),
            ingredients: find("ingredients"),
            steps: find("steps"),
        }
    }
}

/// Result of reading a dataset: parsed recipes plus skipped row count
#[derive(Debug, Default)]
pub struct ParsedRecipes {
    pub documents: Vec<RecipeDocument>,
    pub total_rows: usize,
    pub skipped_rows: usize,
}

/// Text that is embedded for a recipe
pub fn embedding_text(name: &str, ingredients: &str) -> String {
    format!("Recipe: {}\nIngredients: {}\n", name, ingredients)
}

/// Read a recipe CSV into documents without embeddings
///
/// Rows that cannot be converted are logged and skipped.
pub fn read_recipes(path: &Path) -> Result<ParsedRecipes> {
    if !path.is_file() {
        tracing::error!("Data file not found: {}", path.display());
        return Err(CookCompassError::DatasetNotFound(path.display().to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let columns = Columns::from_headers(reader.headers()?);
    if columns.name.is_none() {
        tracing::warn!(
            "Dataset {} has no 'name' column; every row will be skipped",
            path.display()
        );
    }

    let mut parsed = ParsedRecipes::default();
    for (index, result) in reader.records().enumerate() {
        parsed.total_rows += 1;
        let converted = result
            .map_err(CookCompassError::from)
            .and_then(|record| row_to_document(&record, &columns, index));

        match converted {
            Ok(document) => parsed.documents.push(document),
            Err(e) => {
                tracing::warn!("Skipping row {} due to error: {}", index, e);
                parsed.skipped_rows += 1;
            }
        }
    }

    tracing::info!(
        "Read {} rows from '{}': {} recipes, {} skipped",
        parsed.total_rows,
        path.display(),
        parsed.documents.len(),
        parsed.skipped_rows
    );

    Ok(parsed)
}

fn row_to_document(record: &StringRecord, columns: &Columns, index: usize) -> Result<RecipeDocument> {
    let field = |col: Option<usize>| col.and_then(|i| record.get(i)).map(str::trim);

    let name = field(columns.name)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| CookCompassError::Parse("missing recipe name".to_string()))?;

    let raw_tags = field(columns.tags).unwrap_or("");
    // Ingredients fall back to tags when the column is absent
    let ingredients = match columns.ingredients {
        Some(_) => clean_list_string(field(columns.ingredients).unwrap_or("")),
        None => clean_list_string(raw_tags),
    };
    let steps = clean_list_string(field(columns.steps).unwrap_or(""));

    let minutes = match field(columns.minutes).filter(|m| !m.is_empty()) {
        Some(m) => parse_minutes(m)?,
        None => 0,
    };

    let original_id = match field(columns.id).filter(|id| !id.is_empty()) {
        Some(id) => id
            .parse::<i64>()
            .map_err(|_| CookCompassError::Parse(format!("invalid id '{}'", id)))?,
        None => index as i64,
    };

    let meta = RecipeMetadata {
        name: name.to_string(),
        steps,
        minutes,
        tags: parse_tags(raw_tags).into_iter().collect(),
        original_id,
    };

    Ok(RecipeDocument::new(embedding_text(name, &ingredients), meta))
}

fn parse_minutes(value: &str) -> Result<u32> {
    if let Ok(m) = value.parse::<u32>() {
        return Ok(m);
    }
    // Exported frames sometimes write integers as floats
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        _ => Err(CookCompassError::Parse(format!("invalid minutes '{}'", value))),
    }
}
