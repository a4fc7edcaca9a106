//! LLM integration
//!
//! Provides traits and implementations for:
//! - Chat completions, whole or streamed, via external services
//! - Embedding generation via the same services

mod cache;
mod client;
mod http_embedder;
mod traits;

pub use cache::{embedding_cache_key, EmbeddingCache};
pub use client::{ChatMessage, FragmentSink, GenerationMode, HttpLLMClient, LLMClient, Role};
pub use http_embedder::HttpEmbedder;
pub use traits::*;
