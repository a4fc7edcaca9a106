//! HTTP-based embedder using external LLM service

use super::{Embedder, HttpLLMClient};
use crate::config::{Config, Secrets};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Embedder that uses external HTTP service (Hugging Face, vLLM, OpenAI, etc.)
pub struct HttpEmbedder {
    client: Arc<HttpLLMClient>,
}

impl HttpEmbedder {
    /// Create from LLM client
    pub fn new(client: Arc<HttpLLMClient>) -> Self {
        Self { client }
    }

    /// Create from configuration
    pub fn from_config(config: &Config, secrets: &Secrets) -> Result<Self> {
        let client = HttpLLMClient::from_config(config, secrets)?;
        Ok(Self::new(Arc::new(client)))
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.client.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.client.embedding_dimensions()
    }

    fn model_name(&self) -> &str {
        self.client.embedding_model()
    }
}
