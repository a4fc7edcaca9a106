//! Recording fakes for the inference pipeline

#![allow(dead_code)]

use async_trait::async_trait;
use cookcompass_core::db::{MetadataFilter, RecipeMetadata};
use cookcompass_core::{
    ChatMessage, CookCompassError, Database, DocumentStore, Embedder, GenerationMode, LLMClient,
    RecipeDocument, Result, ScoredRecipe,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Ordered record of every external call made during a test
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Rewrite(String),
    Keywords(String),
    Generate { messages: Vec<ChatMessage>, streaming: bool },
    Embed(String),
    EmbedBatch(usize),
    Count,
    Write(usize),
    Query,
}

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(|c| pred(c))
    }

    pub fn rposition(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().rposition(|c| pred(c))
    }
}

/// Chat model with canned replies per pipeline stage
pub struct FakeLLM {
    pub log: CallLog,
    pub rewrite_reply: Result<String>,
    pub keywords_reply: Result<String>,
    pub answer: Vec<&'static str>,
}

impl FakeLLM {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            rewrite_reply: Ok(String::new()),
            keywords_reply: Ok(String::new()),
            answer: vec!["Here ", "is ", "a ", "recipe."],
        }
    }
}

fn clone_result(r: &Result<String>) -> Result<String> {
    match r {
        Ok(s) => Ok(s.clone()),
        Err(e) => Err(CookCompassError::Llm(e.to_string())),
    }
}

#[async_trait]
impl LLMClient for FakeLLM {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        mode: GenerationMode,
    ) -> Result<String> {
        let first = messages.first().map(|m| m.content.clone()).unwrap_or_default();

        if first.contains("improving search queries") {
            self.log.push(Call::Rewrite(first));
            return clone_result(&self.rewrite_reply);
        }
        if first.contains("Available keywords:") {
            self.log.push(Call::Keywords(first));
            return clone_result(&self.keywords_reply);
        }

        self.log.push(Call::Generate {
            messages,
            streaming: mode.is_streaming(),
        });
        if let GenerationMode::Stream(mut sink) = mode {
            for fragment in &self.answer {
                sink(fragment.to_string());
            }
        }
        Ok(self.answer.concat())
    }

    fn model_name(&self) -> &str {
        "fake-chat"
    }
}

/// Embeds text on three food axes so similarity is predictable
pub struct FakeEmbedder {
    pub log: CallLog,
}

pub fn axis_embedding(text: &str) -> Vec<f32> {
    let text = text.to_lowercase();
    vec![
        if text.contains("soup") { 1.0 } else { 0.0 },
        if text.contains("cake") { 1.0 } else { 0.0 },
        if text.contains("salad") { 1.0 } else { 0.0 },
        0.1,
    ]
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.log.push(Call::Embed(text.to_string()));
        Ok(axis_embedding(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.log.push(Call::EmbedBatch(texts.len()));
        Ok(texts.iter().map(|t| axis_embedding(t)).collect())
    }

    fn dimensions(&self) -> usize {
        4
    }

    fn model_name(&self) -> &str {
        "fake-embed"
    }
}

/// Embedder whose `fail_on`-th batch call (1-based) returns a 503
pub struct FailingEmbedder {
    pub log: CallLog,
    pub fail_on: usize,
    pub batches: AtomicUsize,
}

impl FailingEmbedder {
    pub fn new(log: CallLog, fail_on: usize) -> Self {
        Self {
            log,
            fail_on,
            batches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.log.push(Call::Embed(text.to_string()));
        Ok(axis_embedding(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.log.push(Call::EmbedBatch(texts.len()));
        let call = self.batches.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(CookCompassError::Llm(format!("503 on batch {}", call)));
        }
        Ok(texts.iter().map(|t| axis_embedding(t)).collect())
    }

    fn dimensions(&self) -> usize {
        4
    }

    fn model_name(&self) -> &str {
        "fake-embed"
    }
}

/// In-memory SQLite store that records calls
pub struct RecordingStore {
    pub db: Database,
    pub log: CallLog,
}

impl RecordingStore {
    pub fn new(log: CallLog) -> Self {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        Self { db, log }
    }
}

impl DocumentStore for RecordingStore {
    fn count_documents(&self) -> Result<usize> {
        self.log.push(Call::Count);
        self.db.count_documents()
    }

    fn write_documents(&self, documents: &[RecipeDocument]) -> Result<usize> {
        self.log.push(Call::Write(documents.len()));
        self.db.write_documents(documents)
    }

    fn query(
        &self,
        embedding: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredRecipe>> {
        self.log.push(Call::Query);
        self.db.query(embedding, top_k, filter)
    }

    fn register_embedding_model(&self, model: &str, dimensions: usize) -> Result<()> {
        self.db.register_embedding_model(model, dimensions)
    }

    fn registered_model(&self) -> Result<Option<String>> {
        self.db.registered_model()
    }
}

pub fn recipe(name: &str, id: i64, tags: &[&str]) -> RecipeDocument {
    let content = format!("Recipe: {}\nIngredients: water, salt\n", name);
    let embedding = axis_embedding(&content);
    RecipeDocument::new(
        content,
        RecipeMetadata {
            name: name.to_string(),
            steps: "cook, serve".to_string(),
            minutes: 30,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            original_id: id,
        },
    )
    .with_embedding(embedding)
}

pub fn config_yaml(store: &str, dataset: &str) -> String {
    format!(
        r#"
embeddings_model: fake-embed
llm: fake-chat
paths:
  store: {store}
  data: data
  dataset_file: {dataset}
retrieval:
  top_k: 5
generation_timeout_secs: 10
keywords: [vegan, dessert, quick]
"#
    )
}
