//! HTTP client for external LLM services (Hugging Face router, vLLM, OpenAI, etc.)

use crate::config::{Config, LLMServiceConfig, Secrets};
use crate::error::{CookCompassError, Result};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use super::cache::{embedding_cache_key, EmbeddingCache};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

const INITIAL_BACKOFF_MS: u64 = 500;
const MAX_RETRY_WAIT_MS: u64 = 30_000;

/// Trait for chat-completion clients
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a chat completion.
    ///
    /// In [`GenerationMode::Stream`] every fragment is handed to the sink as
    /// it arrives; the returned string is always the full reply.
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        mode: GenerationMode,
    ) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "System"),
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "Assistant"),
        }
    }
}

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Receives streamed fragments in emission order
pub type FragmentSink = Box<dyn FnMut(String) + Send>;

/// How a single chat completion should be delivered
pub enum GenerationMode {
    /// One reply, returned when complete
    Complete,
    /// Fragments pushed to the sink as they are produced
    Stream(FragmentSink),
}

impl GenerationMode {
    pub fn stream<F>(sink: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        Self::Stream(Box::new(sink))
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Stream(_))
    }
}

impl fmt::Debug for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "Complete"),
            Self::Stream(_) => write!(f, "Stream(..)"),
        }
    }
}

/// OpenAI-compatible HTTP client
pub struct HttpLLMClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    chat_model: String,
    embedding_model: String,
    api_token: String,
    embedding_dimensions: AtomicUsize,
    cache: EmbeddingCache,
}

impl HttpLLMClient {
    /// Create new client from service configuration and model names
    pub fn new(
        config: LLMServiceConfig,
        chat_model: impl Into<String>,
        embedding_model: impl Into<String>,
        secrets: &Secrets,
    ) -> Result<Self> {
        // Whole-request timeouts are set per call; streamed replies are bounded by the caller
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(CookCompassError::Http)?;

        let embedding_dimensions = AtomicUsize::new(config.embedding_dimensions.unwrap_or(0));

        Ok(Self {
            http_client,
            config,
            chat_model: chat_model.into(),
            embedding_model: embedding_model.into(),
            api_token: secrets.api_token().to_string(),
            embedding_dimensions,
            cache: EmbeddingCache::new(),
        })
    }

    /// Create from the application settings
    pub fn from_config(config: &Config, secrets: &Secrets) -> Result<Self> {
        Self::new(
            config.llm_service.clone(),
            config.llm.clone(),
            config.embeddings_model.clone(),
            secrets,
        )
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Embedding dimensions, 0 until configured or first observed
    pub fn embedding_dimensions(&self) -> usize {
        self.embedding_dimensions.load(Ordering::Relaxed)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Send request with retry logic for rate limits, unavailable upstreams and timeouts
    async fn send_with_retry(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let req = request.try_clone().ok_or_else(|| {
                CookCompassError::ExternalError("Failed to clone request".to_string())
            })?;

            match req.bearer_auth(&self.api_token).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if matches!(status, 429 | 503) && retries < self.config.max_retries {
                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok());
                        let wait_ms = retry_wait_ms(retry_after, backoff_ms);

                        tracing::warn!(
                            "Inference service returned HTTP {}. Retrying in {} ms (attempt {}/{})",
                            status,
                            wait_ms,
                            retries + 1,
                            self.config.max_retries
                        );

                        tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                        retries += 1;
                        backoff_ms = backoff_ms.saturating_mul(2);
                        continue;
                    }

                    return Ok(response);
                }
                Err(e)
                    if retries < self.config.max_retries && (e.is_timeout() || e.is_connect()) =>
                {
                    let wait_ms = retry_wait_ms(None, backoff_ms);
                    tracing::warn!(
                        "Request to inference service failed ({}). Retrying in {} ms (attempt {}/{})",
                        e,
                        wait_ms,
                        retries + 1,
                        self.config.max_retries
                    );
                    tokio::time::sleep(Duration::from_millis(wait_ms)).await;
                    retries += 1;
                    backoff_ms = backoff_ms.saturating_mul(2);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(CookCompassError::ExternalError(format!(
            "{} error (HTTP {}): {}",
            what, status, body
        )))
    }

    fn chat_request(&self, messages: Vec<ChatMessage>, stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.chat_model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream,
        }
    }

    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = self.chat_request(messages, false);
        let url = endpoint(&self.config.url, "v1/chat/completions");

        let builder = self
            .http_client
            .post(&url)
            .json(&request)
            .timeout(self.request_timeout());
        let response = self.send_with_retry(builder).await?;
        let response = Self::check_status(response, "LLM service").await?;
        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CookCompassError::Llm("No response from LLM".to_string()))
    }

    async fn stream(&self, messages: Vec<ChatMessage>, mut sink: FragmentSink) -> Result<String> {
        let request = self.chat_request(messages, true);
        let url = endpoint(&self.config.url, "v1/chat/completions");

        let response = self
            .send_with_retry(self.http_client.post(&url).json(&request))
            .await?;
        let response = Self::check_status(response, "LLM service").await?;

        let mut events = response.bytes_stream().eventsource();
        let mut full = String::new();

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| {
                CookCompassError::Generation(format!("Malformed event stream: {}", e))
            })?;
            match parse_stream_event(&event.data)? {
                StreamEvent::Fragment(fragment) => {
                    full.push_str(&fragment);
                    sink(fragment);
                }
                StreamEvent::Empty => {}
                StreamEvent::Done => break,
            }
        }

        Ok(full)
    }

    /// Embed texts in one request
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();

        // Check cache for each text
        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut uncached_texts = Vec::new();
        let mut uncached_indices = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            let cache_key = embedding_cache_key(&self.embedding_model, text);
            if let Some(cached) = self.cache.get(&cache_key) {
                results.push(Some(cached));
                continue;
            }
            results.push(None);
            uncached_texts.push(text.clone());
            uncached_indices.push(i);
        }

        if !uncached_texts.is_empty() {
            tracing::debug!(
                "Embedding batch: {} cached, {} to fetch",
                texts.len() - uncached_texts.len(),
                uncached_texts.len()
            );

            let request = EmbedRequest {
                model: self.embedding_model.clone(),
                input: uncached_texts.clone(),
            };
            let url = endpoint(self.config.embeddings_url(), "v1/embeddings");

            let builder = self
                .http_client
                .post(&url)
                .json(&request)
                .timeout(self.request_timeout());
            let response = self.send_with_retry(builder).await?;
            let response = Self::check_status(response, "Embedding service").await?;
            let embed_response: EmbedResponse = response.json().await?;

            if embed_response.data.len() != uncached_texts.len() {
                return Err(CookCompassError::Llm(format!(
                    "Embedding service returned {} vectors for {} inputs",
                    embed_response.data.len(),
                    uncached_texts.len()
                )));
            }

            for (i, data) in embed_response.data.into_iter().enumerate() {
                self.observe_dimensions(data.embedding.len());
                let cache_key = embedding_cache_key(&self.embedding_model, &uncached_texts[i]);
                self.cache.set(cache_key, data.embedding.clone());
                results[uncached_indices[i]] = Some(data.embedding);
            }
        }

        tracing::debug!(
            "Embedded {} texts in {} ms",
            texts.len(),
            start.elapsed().as_millis()
        );

        results
            .into_iter()
            .map(|r| r.ok_or_else(|| CookCompassError::Llm("No embedding returned".to_string())))
            .collect()
    }

    /// Embed a single text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CookCompassError::Llm("No embedding returned".to_string()))
    }

    fn observe_dimensions(&self, dims: usize) {
        let _ = self.embedding_dimensions.compare_exchange(
            0,
            dims,
            Ordering::Relaxed,
            Ordering::Relaxed,
        );
    }
}

#[async_trait]
impl LLMClient for HttpLLMClient {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        mode: GenerationMode,
    ) -> Result<String> {
        let start = Instant::now();
        let result = match mode {
            GenerationMode::Complete => self.complete(messages).await,
            GenerationMode::Stream(sink) => self.stream(messages, sink).await,
        };
        tracing::debug!(
            "Chat completion with {} finished in {} ms",
            self.chat_model,
            start.elapsed().as_millis()
        );
        result
    }

    fn model_name(&self) -> &str {
        &self.chat_model
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// One decoded server-sent event of a streamed completion
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum StreamEvent {
    Fragment(String),
    Empty,
    Done,
}

pub(crate) fn parse_stream_event(data: &str) -> Result<StreamEvent> {
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(StreamEvent::Done);
    }
    if data.is_empty() {
        return Ok(StreamEvent::Empty);
    }

    let chunk: StreamChunk = serde_json::from_str(data)?;
    let fragment = chunk
        .choices
        .into_iter()
        .filter_map(|choice| choice.delta.content)
        .collect::<String>();

    if fragment.is_empty() {
        Ok(StreamEvent::Empty)
    } else {
        Ok(StreamEvent::Fragment(fragment))
    }
}

/// Delay before the next attempt, capped at `MAX_RETRY_WAIT_MS`
///
/// A numeric `Retry-After` (seconds) wins over the exponential backoff.
fn retry_wait_ms(retry_after: Option<&str>, backoff_ms: u64) -> u64 {
    retry_after
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| secs.saturating_mul(1000))
        .unwrap_or(backoff_ms)
        .min(MAX_RETRY_WAIT_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_parse_stream_fragment() {
        let data = r#"{"choices":[{"index":0,"delta":{"content":"Hello"}}]}"#;
        assert_eq!(
            parse_stream_event(data).unwrap(),
            StreamEvent::Fragment("Hello".to_string())
        );
    }

    #[test]
    fn test_parse_stream_role_only_delta() {
        let data = r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_stream_event(data).unwrap(), StreamEvent::Empty);
    }

    #[test]
    fn test_parse_stream_done() {
        assert_eq!(parse_stream_event(" [DONE] ").unwrap(), StreamEvent::Done);
    }

    #[test]
    fn test_parse_stream_garbage_is_error() {
        assert!(parse_stream_event("not json").is_err());
    }

    #[test]
    fn test_retry_wait_is_bounded() {
        assert_eq!(retry_wait_ms(Some("2"), 500), 2000);
        assert_eq!(retry_wait_ms(None, 500), 500);
        assert_eq!(retry_wait_ms(Some("Wed, 21 Oct 2026 07:28:00 GMT"), 1000), 1000);
        assert_eq!(retry_wait_ms(Some("3600"), 500), MAX_RETRY_WAIT_MS);
        assert_eq!(retry_wait_ms(Some(&u64::MAX.to_string()), 500), MAX_RETRY_WAIT_MS);
        assert_eq!(retry_wait_ms(None, u64::MAX), MAX_RETRY_WAIT_MS);
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        assert_eq!(
            endpoint("https://router.huggingface.co/", "v1/embeddings"),
            "https://router.huggingface.co/v1/embeddings"
        );
        assert_eq!(
            endpoint("http://localhost:8000", "v1/chat/completions"),
            "http://localhost:8000/v1/chat/completions"
        );
    }

    #[test]
    fn test_generation_mode_debug() {
        assert_eq!(format!("{:?}", GenerationMode::Complete), "Complete");
        let mode = GenerationMode::stream(|_| {});
        assert!(mode.is_streaming());
        assert_eq!(format!("{:?}", mode), "Stream(..)");
    }

    #[test]
    fn test_client_reports_configured_dimensions() {
        let config = LLMServiceConfig {
            embedding_dimensions: Some(384),
            ..LLMServiceConfig::default()
        };
        let client =
            HttpLLMClient::new(config, "chat", "embed", &Secrets::new("token")).unwrap();
        assert_eq!(client.embedding_dimensions(), 384);
        assert_eq!(client.model_name(), "chat");
        assert_eq!(client.embedding_model(), "embed");
    }
}
