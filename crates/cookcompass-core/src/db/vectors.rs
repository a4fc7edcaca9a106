//! Vector storage operations
//!
//! Stores embeddings as BLOBs and computes cosine similarity in Rust.

use super::recipes::{load_recipe, MetadataFilter, ScoredRecipe};
use super::Database;
use crate::error::{CookCompassError, Result};
use chrono::Utc;
use rusqlite::{params, params_from_iter, OptionalExtension};

impl Database {
    /// Nearest recipes to `query_embedding`, best first
    pub fn search_similar(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredRecipe>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;

        let mut values = Vec::new();
        let predicate = filter
            .map(|f| f.to_sql(&mut values))
            .unwrap_or_else(|| "1 = 1".to_string());
        let sql = format!(
            "SELECT e.recipe_id, e.embedding
             FROM embeddings e
             JOIN recipes r ON r.id = e.recipe_id
             WHERE {}
             ORDER BY e.recipe_id",
            predicate
        );

        let mut stmt = conn.prepare(&sql)?;
        let stored = stmt
            .query_map(params_from_iter(values), |row| {
                let id: String = row.get(0)?;
                let bytes: Vec<u8> = row.get(1)?;
                Ok((id, bytes_to_embedding(&bytes)))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if let Some((_, first)) = stored.first() {
            if first.len() != query_embedding.len() {
                return Err(CookCompassError::InvalidInput(format!(
                    "Query embedding has {} dimensions but the store holds {}-dimensional vectors; \
                     the query must use the ingestion embedding model",
                    query_embedding.len(),
                    first.len()
                )));
            }
        }

        let mut similarities: Vec<(String, f32)> = stored
            .into_iter()
            .map(|(id, embedding)| {
                let sim = cosine_similarity(query_embedding, &embedding);
                (id, sim)
            })
            .collect();

        // Stable sort keeps id order between equal scores
        similarities.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        similarities.truncate(top_k);

        let mut results = Vec::with_capacity(similarities.len());
        for (id, score) in similarities {
            if let Some(document) = load_recipe(&conn, &id)? {
                results.push(ScoredRecipe { document, score });
            }
        }

        Ok(results)
    }

    /// Check if vector index exists and has data
    pub fn has_vector_index(&self) -> bool {
        self.conn()
            .and_then(|conn| {
                conn.query_row("SELECT COUNT(*) FROM embeddings", [], |row| {
                    row.get::<_, i64>(0)
                })
                .map_err(Into::into)
            })
            .map(|count| count > 0)
            .unwrap_or(false)
    }

    /// Register model with its dimensions
    pub fn register_model(&self, model: &str, dimensions: usize) -> Result<()> {
        let now = Utc::now().to_rfc3339();

        self.conn()?.execute(
            "INSERT INTO model_metadata (model, dimensions, created_at, last_used_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(model) DO UPDATE SET dimensions = ?2, last_used_at = ?3",
            params![model, dimensions as i64, now],
        )?;

        Ok(())
    }

    /// Most recently used embedding model, if any
    pub fn current_model(&self) -> Result<Option<(String, usize)>> {
        let row = self
            .conn()?
            .query_row(
                "SELECT model, dimensions FROM model_metadata ORDER BY last_used_at DESC LIMIT 1",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;
        Ok(row.map(|(model, dims)| (model, dims as usize)))
    }
}

/// Convert f32 embedding to bytes (little-endian)
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes to f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{RecipeDocument, RecipeMetadata};

    fn recipe(name: &str, id: i64, tags: &[&str], embedding: Vec<f32>) -> RecipeDocument {
        RecipeDocument::new(
            format!("Recipe: {}\n", name),
            RecipeMetadata {
                name: name.to_string(),
                steps: String::new(),
                minutes: 10,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                original_id: id,
            },
        )
        .with_embedding(embedding)
    }

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.insert_recipes(&[
            recipe("chicken soup", 1, &["soups-stews"], vec![1.0, 0.0, 0.0]),
            recipe("vegan soup", 2, &["soups-stews", "vegan"], vec![0.9, 0.1, 0.0]),
            recipe("chocolate cake", 3, &["desserts"], vec![0.0, 0.0, 1.0]),
        ])
        .unwrap();
        db
    }

    #[test]
    fn test_embedding_roundtrip() {
        let original = vec![1.0f32, 2.0, 3.0, -1.5];
        let bytes = embedding_to_bytes(&original);
        let restored = bytes_to_embedding(&bytes);
        assert_eq!(original, restored);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!((sim - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!(sim.abs() < 0.0001);
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let db = seeded();
        let results = db.search_similar(&[1.0, 0.0, 0.0], 10, None).unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.document.meta.name.as_str()).collect();
        assert_eq!(names, vec!["chicken soup", "vegan soup", "chocolate cake"]);
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[test]
    fn test_search_respects_top_k() {
        let db = seeded();
        let results = db.search_similar(&[1.0, 0.0, 0.0], 2, None).unwrap();
        assert_eq!(results.len(), 2);
        assert!(db.search_similar(&[1.0, 0.0, 0.0], 0, None).unwrap().is_empty());
    }

    #[test]
    fn test_search_with_tag_filter() {
        let db = seeded();
        let filter = MetadataFilter::all_tags(["soups-stews", "vegan"]);
        let results = db.search_similar(&[1.0, 0.0, 0.0], 10, Some(&filter)).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.meta.name, "vegan soup");
    }

    #[test]
    fn test_search_with_name_filter() {
        let db = seeded();
        let filter = MetadataFilter::Name("chocolate cake".into());
        let results = db.search_similar(&[1.0, 0.0, 0.0], 10, Some(&filter)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.meta.original_id, 3);
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let db = seeded();
        let err = db.search_similar(&[1.0, 0.0], 10, None).unwrap_err();
        assert!(matches!(err, CookCompassError::InvalidInput(_)));
    }

    #[test]
    fn test_model_registration() {
        let db = seeded();
        assert_eq!(db.current_model().unwrap(), None);
        db.register_model("mini", 3).unwrap();
        assert_eq!(db.current_model().unwrap(), Some(("mini".to_string(), 3)));
    }
}
