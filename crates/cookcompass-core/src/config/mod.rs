//! Configuration management

mod secrets;

pub use secrets::{Secrets, API_TOKEN_ENV};

use crate::error::{CookCompassError, Result};
use crate::retrieval::RetrievalStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that points at the settings document
pub const CONFIG_PATH_ENV: &str = "COOKCOMPASS_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Embedding model used both at ingestion and at query time
    pub embeddings_model: String,

    /// Chat model used for rewriting, keyword extraction and answers
    pub llm: String,

    /// Storage and dataset locations
    pub paths: PathsConfig,

    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Upper bound on a single streamed generation
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,

    /// Optional override of the built-in keyword vocabulary
    #[serde(default)]
    pub keywords: Option<Vec<String>>,

    /// Directory relative paths are resolved against (the config file's parent)
    #[serde(skip)]
    pub root: PathBuf,
}

/// Storage and dataset locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// SQLite recipe store
    pub store: PathBuf,

    /// Directory holding the raw dataset
    pub data: PathBuf,

    /// CSV file inside `data`
    #[serde(default = "default_dataset_file")]
    pub dataset_file: String,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the OpenAI-compatible service for chat completions
    #[serde(default = "default_llm_url")]
    pub url: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Embedding dimensions (detected from the first response if not specified)
    #[serde(default)]
    pub embedding_dimensions: Option<usize>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries for rate limits, unavailable upstreams and timeouts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Sampling temperature for chat completions
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per chat completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            embedding_url: std::env::var("COOKCOMPASS_EMBEDDING_URL").ok(),
            embedding_dimensions: std::env::var("COOKCOMPASS_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub strategy: RetrievalStrategy,

    /// Number of nearest neighbours fetched per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strategy: RetrievalStrategy::default(),
            top_k: default_top_k(),
        }
    }
}

fn default_llm_url() -> String {
    std::env::var("COOKCOMPASS_LLM_URL")
        .unwrap_or_else(|_| "https://router.huggingface.co".to_string())
}

fn default_dataset_file() -> String {
    "small_recipes.csv".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_top_k() -> usize {
    20
}

fn default_generation_timeout() -> u64 {
    120
}

impl Config {
    /// Load config from `COOKCOMPASS_CONFIG` or the default path
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        Self::from_path(path)
    }

    /// Load config from an explicit path; a missing file is a startup error
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CookCompassError::Config(format!(
                "Config file not found at {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_yaml_str(&content, root)
    }

    /// Parse a settings document, resolving relative paths against `root`
    pub fn from_yaml_str(content: &str, root: impl Into<PathBuf>) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(content)?;
        config.root = root.into();
        config.validate()?;
        Ok(config)
    }

    /// Get default config path (`./config.yaml`, then the user config dir)
    pub fn default_path() -> PathBuf {
        let local = PathBuf::from("config.yaml");
        if local.exists() {
            return local;
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yaml")
    }

    /// Absolute location of the recipe store
    pub fn store_path(&self) -> PathBuf {
        self.resolve(&self.paths.store)
    }

    /// Absolute location of the dataset CSV
    pub fn dataset_path(&self) -> PathBuf {
        self.resolve(&self.paths.data).join(&self.paths.dataset_file)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.embeddings_model.trim().is_empty() {
            return Err(CookCompassError::Config(
                "embeddings_model must not be empty".to_string(),
            ));
        }
        if self.llm.trim().is_empty() {
            return Err(CookCompassError::Config("llm must not be empty".to_string()));
        }
        if self.retrieval.top_k == 0 {
            return Err(CookCompassError::Config(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        if self.generation_timeout_secs == 0 {
            return Err(CookCompassError::Config(
                "generation_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
