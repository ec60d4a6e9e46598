//! Configuration management for docqa.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (`.docqa/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: documents, the two index
//! partitions and prompt overrides all live below the workspace root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Generative model providers the CLI can talk to.
const KNOWN_LLM_PROVIDERS: [&str; 1] = ["ollama"];

/// Embedding providers a partition can be built with.
const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .docqa/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generative model provider (e.g., "ollama")
    pub provider: String,

    /// Generative model identifier
    pub model: String,

    /// Custom provider endpoint
    pub endpoint: Option<String>,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Sampling temperature for classification and answers
    pub temperature: Option<f32>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Document and index settings
    pub index: IndexSettings,
}

/// Document collection and index partition settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexSettings {
    /// Folder holding the raw documents
    pub documents_dir: PathBuf,

    /// Folder holding the partition databases
    pub index_dir: PathBuf,

    /// Target chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,

    /// Default retrieval fan-out
    pub top_k: usize,

    /// Embedding model for the PDF partition
    pub pdf_embedding: EmbeddingSettings,

    /// Embedding model for the partition holding every other format
    pub non_pdf_embedding: EmbeddingSettings,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("documents"),
            index_dir: PathBuf::from(".docqa/index"),
            chunk_size: 600,
            chunk_overlap: 100,
            top_k: 3,
            pdf_embedding: EmbeddingSettings::default(),
            non_pdf_embedding: EmbeddingSettings::default(),
        }
    }
}

/// Embedding provider settings for one partition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingSettings {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Custom endpoint (ollama only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    logging: Option<LoggingSection>,
    index: Option<IndexSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "gemma3".to_string(),
            endpoint: None,
            api_key: None,
            temperature: None,
            log_level: None,
            verbose: false,
            no_color: false,
            index: IndexSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// `workspace` and `config_file` are the command-line values (if any);
    /// they take precedence over `DOCQA_WORKSPACE` / `DOCQA_CONFIG` because
    /// they decide which file gets read.
    ///
    /// Environment variables:
    /// - `DOCQA_WORKSPACE`: Override workspace path
    /// - `DOCQA_CONFIG`: Path to config file
    /// - `DOCQA_PROVIDER`: LLM provider
    /// - `DOCQA_MODEL`: Model identifier
    /// - `DOCQA_ENDPOINT`: Provider endpoint
    /// - `DOCQA_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env_path("DOCQA_WORKSPACE")) {
            config.workspace = workspace;
        }
        config.config_file = config_file.or_else(|| env_path("DOCQA_CONFIG"));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.docqa_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("DOCQA_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("DOCQA_MODEL") {
            config.model = model;
        }

        if let Ok(endpoint) = std::env::var("DOCQA_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        if let Ok(api_key) = std::env::var("DOCQA_API_KEY") {
            config.api_key = Some(api_key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if let Some(endpoint) = llm.endpoint {
                result.endpoint = Some(endpoint);
            }
            if let Some(env_var) = llm.api_key_env {
                result.api_key = std::env::var(&env_var).ok();
            }
            if let Some(temperature) = llm.temperature {
                result.temperature = Some(temperature);
            }
        }

        if let Some(index) = config_file.index {
            result.index = index;
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Gives precedence to command-line flags over environment variables
    /// and the config file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .docqa directory.
    pub fn docqa_dir(&self) -> PathBuf {
        self.workspace.join(".docqa")
    }

    /// Ensure the .docqa directory exists.
    pub fn ensure_docqa_dir(&self) -> AppResult<()> {
        let docqa_dir = self.docqa_dir();
        if !docqa_dir.exists() {
            std::fs::create_dir_all(&docqa_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .docqa directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Documents folder, resolved against the workspace.
    pub fn documents_dir(&self) -> PathBuf {
        self.resolve(&self.index.documents_dir)
    }

    /// Index folder, resolved against the workspace.
    pub fn index_dir(&self) -> PathBuf {
        self.resolve(&self.index.index_dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Validate configuration before serving queries or building indexes.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_LLM_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(AppError::Config(format!(
                    "llm.temperature must be between 0 and 2, got {}",
                    temperature
                )));
            }
        }

        let index = &self.index;
        if index.chunk_size == 0 {
            return Err(AppError::Config("chunkSize must be positive".to_string()));
        }

        if index.chunk_overlap >= index.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                index.chunk_overlap, index.chunk_size
            )));
        }

        if index.top_k == 0 {
            return Err(AppError::Config("topK must be at least 1".to_string()));
        }

        for (name, embedding) in [
            ("pdfEmbedding", &index.pdf_embedding),
            ("nonPdfEmbedding", &index.non_pdf_embedding),
        ] {
            if !KNOWN_EMBEDDING_PROVIDERS.contains(&embedding.provider.as_str()) {
                return Err(AppError::Config(format!(
                    "Unknown embedding provider in {}: {}. Supported: {}",
                    name,
                    embedding.provider,
                    KNOWN_EMBEDDING_PROVIDERS.join(", ")
                )));
            }
            if embedding.dimensions == 0 {
                return Err(AppError::Config(format!(
                    "{}.dimensions must be positive",
                    name
                )));
            }
        }

        Ok(())
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().map(PathBuf::from)
}
