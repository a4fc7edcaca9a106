//! Recipe document store
//!
//! SQLite-backed storage with:
//! - Content-addressed recipe documents
//! - Tag membership for exact-match filters
//! - Embedding BLOBs ranked by cosine similarity

mod content;
mod recipes;
mod schema;
mod stats;
pub mod vectors;

pub use content::{docid_from_hash, hash_content, recipe_id};
pub use recipes::{MetadataFilter, RecipeDocument, RecipeMetadata, ScoredRecipe};
pub use schema::Database;
pub use stats::DatabaseStats;

use crate::error::Result;

/// Narrow contract the engine and ingestion need from a document store
pub trait DocumentStore: Send + Sync {
    /// Number of stored documents
    fn count_documents(&self) -> Result<usize>;

    /// Persist embedded documents, returning how many were written
    fn write_documents(&self, documents: &[RecipeDocument]) -> Result<usize>;

    /// Top-k nearest documents to `embedding`, in descending similarity
    fn query(
        &self,
        embedding: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredRecipe>>;

    /// Record which embedding model produced the stored vectors
    fn register_embedding_model(&self, _model: &str, _dimensions: usize) -> Result<()> {
        Ok(())
    }

    /// Model that produced the stored vectors, if one was recorded
    fn registered_model(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

impl DocumentStore for Database {
    fn count_documents(&self) -> Result<usize> {
        self.count_recipes()
    }

    fn write_documents(&self, documents: &[RecipeDocument]) -> Result<usize> {
        self.insert_recipes(documents)
    }

    fn query(
        &self,
        embedding: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredRecipe>> {
        self.search_similar(embedding, top_k, filter)
    }

    fn register_embedding_model(&self, model: &str, dimensions: usize) -> Result<()> {
        self.register_model(model, dimensions)
    }

    fn registered_model(&self) -> Result<Option<String>> {
        Ok(self.current_model()?.map(|(model, _)| model))
    }
}
