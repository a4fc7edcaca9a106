//! Text query to ranked recipes
//!
//! Dense retrieval embeds the query with the ingestion-time model and runs a
//! nearest-neighbour search against the document store.

use crate::db::{DocumentStore, MetadataFilter, ScoredRecipe};
use crate::error::{CookCompassError, Result};
use crate::llm::Embedder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Retrieval strategies that can be configured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalStrategy {
    #[default]
    Dense,
    Hybrid,
}

impl fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dense => write!(f, "dense"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Fail when the store was embedded with a different model than `embedder`
///
/// Vectors from two models are not comparable even when their dimensions
/// agree. A store with no recorded model passes.
pub fn ensure_same_model(store: &dyn DocumentStore, embedder: &dyn Embedder) -> Result<()> {
    match store.registered_model()? {
        Some(stored) if stored != embedder.model_name() => Err(CookCompassError::Config(format!(
            "Recipe store was embedded with '{}' but the configured embedding model is '{}'; \
             run 'cookcompass ingest --force' to re-embed",
            stored,
            embedder.model_name()
        ))),
        _ => Ok(()),
    }
}

/// Embedding plus similarity search against a document store
pub struct DenseRetriever {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl DenseRetriever {
    pub fn new(store: Arc<dyn DocumentStore>, embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self {
            store,
            embedder,
            top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    async fn retrieve(
        &self,
        query: &str,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredRecipe>> {
        let embedding = self.embedder.embed(query).await?;
        let results = self.store.query(&embedding, self.top_k, filter)?;
        tracing::debug!(
            "Dense retrieval for {:?} returned {} recipes",
            query,
            results.len()
        );
        Ok(results)
    }
}

/// Closed set of retrieval strategies
pub enum Retriever {
    Dense(DenseRetriever),
    /// Lexical and dense fusion; not available yet
    Hybrid,
}

impl Retriever {
    /// Build the retriever named by `strategy`
    pub fn new(
        strategy: RetrievalStrategy,
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn Embedder>,
        top_k: usize,
    ) -> Self {
        match strategy {
            RetrievalStrategy::Dense => Self::Dense(DenseRetriever::new(store, embedder, top_k)),
            RetrievalStrategy::Hybrid => Self::Hybrid,
        }
    }

    pub fn strategy(&self) -> RetrievalStrategy {
        match self {
            Self::Dense(_) => RetrievalStrategy::Dense,
            Self::Hybrid => RetrievalStrategy::Hybrid,
        }
    }

    /// Ranked recipes for `query`, most similar first
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredRecipe>> {
        self.retrieve_filtered(query, None).await
    }

    /// Ranked recipes for `query` restricted by an exact-match metadata filter
    pub async fn retrieve_filtered(
        &self,
        query: &str,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredRecipe>> {
        match self {
            Self::Dense(dense) => dense.retrieve(query, filter).await,
            Self::Hybrid => Err(CookCompassError::NotImplemented(
                "hybrid retrieval".to_string(),
            )),
        }
    }
}
