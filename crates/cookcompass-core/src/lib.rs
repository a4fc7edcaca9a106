//! Cook Compass Core Library
//!
//! Core functionality for the cookcompass recipe assistant.
//!
//! # Features
//! - SQLite recipe store with embedding BLOBs and cosine ranking
//! - CSV ingestion with batched embedding
//! - Conversation-aware query rewriting and keyword post-filtering
//! - Streamed, retrieval-grounded answers over OpenAI-compatible services

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod retrieval;

pub use config::{Config, LLMServiceConfig, Secrets};
pub use db::{Database, DatabaseStats, DocumentStore, MetadataFilter, RecipeDocument, ScoredRecipe};
pub use engine::{FilterOutcome, InferenceEngine, Refinement, ResponseStream, TurnPlan, Vocabulary};
pub use error::{CookCompassError, Error, Result};
pub use ingest::{IngestOutcome, IngestProgress, IngestStats};
pub use llm::{ChatMessage, Embedder, GenerationMode, HttpEmbedder, HttpLLMClient, LLMClient, Role};
pub use retrieval::{ensure_same_model, RetrievalStrategy, Retriever};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "cookcompass";
