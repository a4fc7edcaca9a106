//! Database statistics

use super::Database;
use crate::error::Result;

/// Recipe store stats
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatabaseStats {
    pub recipe_count: usize,
    pub embedded_count: usize,
    pub distinct_tags: usize,
    pub embedding_model: Option<String>,
    pub embedding_dimensions: Option<usize>,
}

impl Database {
    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let recipe_count = self.count_recipes()?;

        let (embedded_count, distinct_tags) = {
            let conn = self.conn()?;
            let embedded: i64 = conn
                .query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))
                .unwrap_or(0);
            let tags: i64 = conn
                .query_row("SELECT COUNT(DISTINCT tag) FROM recipe_tags", [], |row| {
                    row.get(0)
                })
                .unwrap_or(0);
            (embedded as usize, tags as usize)
        };

        let model = self.current_model()?;

        Ok(DatabaseStats {
            recipe_count,
            embedded_count,
            distinct_tags,
            embedding_model: model.as_ref().map(|(name, _)| name.clone()),
            embedding_dimensions: model.map(|(_, dims)| dims),
        })
    }
}
