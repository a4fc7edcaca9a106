//! Inference engine
//!
//! One conversational turn runs through:
//! 1. Query rewriting against recent history
//! 2. Dense retrieval of candidate recipes
//! 3. Keyword extraction and tag post-filtering
//! 4. Prompt assembly
//! 5. Streamed generation

mod filter;
mod keywords;
mod prompt;
mod refinement;
mod rewrite;
mod stream;

pub use filter::{filter_by_keywords, FilterOutcome};
pub use keywords::{extract_keywords, parse_keywords, Vocabulary, DEFAULT_KEYWORDS};
pub use prompt::{build_messages, keywords_prompt, render_context, rewrite_prompt, transcript};
pub use refinement::Refinement;
pub use rewrite::{rewrite_query, HISTORY_WINDOW};
pub use stream::ResponseStream;

use crate::config::{Config, Secrets};
use crate::db::{Database, DocumentStore, ScoredRecipe};
use crate::error::Result;
use crate::ingest::{ensure_ingested, IngestOutcome, ProgressCallback};
use crate::llm::{ChatMessage, Embedder, HttpEmbedder, HttpLLMClient, LLMClient};
use crate::retrieval::{ensure_same_model, Retriever};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Everything decided for a turn before generation starts
#[derive(Debug, Clone)]
pub struct TurnPlan {
    pub search_query: Refinement<String>,
    pub keywords: Refinement<Vec<String>>,
    pub filter: FilterOutcome,
    pub documents: Vec<ScoredRecipe>,
    pub messages: Vec<ChatMessage>,
}

/// Retrieval-augmented answer generation over a conversation
pub struct InferenceEngine {
    llm: Arc<dyn LLMClient>,
    retriever: Retriever,
    vocabulary: Vocabulary,
    generation_timeout: Duration,
}

impl InferenceEngine {
    /// Assemble from pre-built parts
    pub fn new(llm: Arc<dyn LLMClient>, retriever: Retriever, vocabulary: Vocabulary) -> Self {
        Self {
            llm,
            retriever,
            vocabulary,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Open the configured store, ingest if it is empty, and build HTTP clients
    pub async fn from_config(config: &Config, secrets: &Secrets) -> Result<Self> {
        Self::from_config_with_progress(config, secrets, None).await
    }

    pub async fn from_config_with_progress(
        config: &Config,
        secrets: &Secrets,
        progress: Option<ProgressCallback>,
    ) -> Result<Self> {
        let db = Database::open(config.store_path())?;
        db.initialize()?;

        let client = Arc::new(HttpLLMClient::from_config(config, secrets)?);
        let embedder = Arc::new(HttpEmbedder::new(client.clone()));

        Self::bootstrap(config, Arc::new(db), client, embedder, progress).await
    }

    /// Ingest into `store` when it is empty, then build the engine over it
    pub async fn bootstrap(
        config: &Config,
        store: Arc<dyn DocumentStore>,
        llm: Arc<dyn LLMClient>,
        embedder: Arc<dyn Embedder>,
        progress: Option<ProgressCallback>,
    ) -> Result<Self> {
        match ensure_ingested(config, store.as_ref(), embedder.as_ref(), progress).await? {
            IngestOutcome::AlreadyPopulated(count) => {
                tracing::info!("Document store found with {} recipes", count);
            }
            IngestOutcome::Ingested(stats) => {
                tracing::info!("Ingested {} recipes", stats.documents_written);
            }
        }
        ensure_same_model(store.as_ref(), embedder.as_ref())?;

        let retriever = Retriever::new(
            config.retrieval.strategy,
            store,
            embedder,
            config.retrieval.top_k,
        );
        let vocabulary = Vocabulary::from_override(config.keywords.as_deref());

        Ok(Self::new(llm, retriever, vocabulary)
            .with_generation_timeout(Duration::from_secs(config.generation_timeout_secs)))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Run every stage up to generation; `None` for an empty conversation
    pub async fn prepare_turn(&self, conversation: &[ChatMessage]) -> Result<Option<TurnPlan>> {
        let Some((last, prior_turns)) = conversation.split_last() else {
            return Ok(None);
        };

        let search_query = rewrite_query(self.llm.as_ref(), conversation).await;

        let candidates = self.retriever.retrieve(search_query.value()).await?;
        tracing::info!(
            "Retrieved {} recipes for '{}'",
            candidates.len(),
            search_query.value()
        );

        let keywords =
            extract_keywords(self.llm.as_ref(), search_query.value(), &self.vocabulary).await;
        let (documents, filter) = filter_by_keywords(candidates, keywords.value());

        let messages = build_messages(&last.content, &documents, prior_turns);
        tracing::debug!("Prompt assembled with {} messages", messages.len());

        Ok(Some(TurnPlan {
            search_query,
            keywords,
            filter,
            documents,
            messages,
        }))
    }

    /// Grounded assistant reply as a fragment stream
    pub async fn stream_response(&self, conversation: &[ChatMessage]) -> Result<ResponseStream> {
        let Some(plan) = self.prepare_turn(conversation).await? else {
            return Ok(ResponseStream::empty());
        };
        Ok(self.generate(plan.messages))
    }

    /// Stream the answer for an already prepared turn
    pub fn stream_plan(&self, plan: &TurnPlan) -> ResponseStream {
        self.generate(plan.messages.clone())
    }

    fn generate(&self, messages: Vec<ChatMessage>) -> ResponseStream {
        ResponseStream::spawn(self.llm.clone(), messages, self.generation_timeout)
    }

    /// Full reply as one string
    pub async fn respond(&self, conversation: &[ChatMessage]) -> Result<String> {
        self.stream_response(conversation).await?.collect_text().await
    }
}
