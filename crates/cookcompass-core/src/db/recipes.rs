//! Recipe document operations

use super::content::recipe_id;
use super::vectors::embedding_to_bytes;
use super::Database;
use crate::error::{CookCompassError, Result};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Metadata carried alongside each recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeMetadata {
    pub name: String,
    pub steps: String,
    pub minutes: u32,
    pub tags: BTreeSet<String>,
    pub original_id: i64,
}

/// A recipe as stored in the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDocument {
    pub id: String,
    /// Text that was embedded (name and ingredients)
    pub content: String,
    pub meta: RecipeMetadata,
    /// Present when writing; not loaded back on retrieval
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
}

impl RecipeDocument {
    pub fn new(content: impl Into<String>, meta: RecipeMetadata) -> Self {
        let content = content.into();
        Self {
            id: recipe_id(&content, meta.original_id),
            content,
            meta,
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Retrieval hit with its similarity score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecipe {
    pub document: RecipeDocument,
    pub score: f32,
}

/// Exact-match metadata filter applied before similarity ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataFilter {
    Tag(String),
    Name(String),
    OriginalId(i64),
    All(Vec<MetadataFilter>),
}

impl MetadataFilter {
    /// Conjunction of tag filters
    pub fn all_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::All(tags.into_iter().map(|t| Self::Tag(t.into())).collect())
    }

    /// Render as a SQL predicate over `recipes r`, pushing bound values
    pub(crate) fn to_sql(&self, values: &mut Vec<Value>) -> String {
        match self {
            Self::Tag(tag) => {
                values.push(Value::Text(tag.clone()));
                "r.id IN (SELECT recipe_id FROM recipe_tags WHERE tag = ?)".to_string()
            }
            Self::Name(name) => {
                values.push(Value::Text(name.clone()));
                "r.name = ?".to_string()
            }
            Self::OriginalId(id) => {
                values.push(Value::Integer(*id));
                "r.original_id = ?".to_string()
            }
            Self::All(filters) if filters.is_empty() => "1 = 1".to_string(),
            Self::All(filters) => {
                let parts: Vec<String> = filters.iter().map(|f| f.to_sql(values)).collect();
                format!("({})", parts.join(" AND "))
            }
        }
    }

    /// Evaluate the filter against an in-memory document
    pub fn matches(&self, document: &RecipeDocument) -> bool {
        match self {
            Self::Tag(tag) => document.meta.tags.contains(tag),
            Self::Name(name) => document.meta.name == *name,
            Self::OriginalId(id) => document.meta.original_id == *id,
            Self::All(filters) => filters.iter().all(|f| f.matches(document)),
        }
    }
}

impl Database {
    /// Write embedded recipes; re-writing the same recipe replaces it
    pub fn insert_recipes(&self, documents: &[RecipeDocument]) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for doc in documents {
            let embedding = doc.embedding.as_ref().ok_or_else(|| {
                CookCompassError::InvalidInput(format!(
                    "Recipe '{}' has no embedding and cannot be written",
                    doc.meta.name
                ))
            })?;

            tx.execute(
                "INSERT OR REPLACE INTO recipes (id, original_id, name, content, steps, minutes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    doc.id,
                    doc.meta.original_id,
                    doc.meta.name,
                    doc.content,
                    doc.meta.steps,
                    doc.meta.minutes,
                    now
                ],
            )?;

            tx.execute(
                "DELETE FROM recipe_tags WHERE recipe_id = ?1",
                params![doc.id],
            )?;
            for tag in &doc.meta.tags {
                tx.execute(
                    "INSERT OR IGNORE INTO recipe_tags (recipe_id, tag) VALUES (?1, ?2)",
                    params![doc.id, tag],
                )?;
            }

            tx.execute(
                "INSERT OR REPLACE INTO embeddings (recipe_id, embedding) VALUES (?1, ?2)",
                params![doc.id, embedding_to_bytes(embedding)],
            )?;
        }

        tx.commit()?;
        Ok(documents.len())
    }

    /// Count stored recipes
    pub fn count_recipes(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Load a recipe row and its tags
pub(crate) fn load_recipe(conn: &Connection, id: &str) -> Result<Option<RecipeDocument>> {
    let row = conn
        .query_row(
            "SELECT id, original_id, name, content, steps, minutes FROM recipes WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((id, original_id, name, content, steps, minutes)) = row else {
        return Ok(None);
    };

    let mut stmt = conn.prepare("SELECT tag FROM recipe_tags WHERE recipe_id = ?1")?;
    let tags = stmt
        .query_map(params![id], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<BTreeSet<_>, _>>()?;

    Ok(Some(RecipeDocument {
        id,
        content,
        meta: RecipeMetadata {
            name,
            steps,
            minutes: u32::try_from(minutes).unwrap_or(0),
            tags,
            original_id,
        },
        embedding: None,
    }))
}
