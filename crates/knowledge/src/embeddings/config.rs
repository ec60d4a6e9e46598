//! Embedding configuration for one index partition.

use docqa_core::{AppError, AppResult, EmbeddingSettings};
use serde::{Deserialize, Serialize};

/// How one partition's chunks and queries are embedded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// "trigram" or "ollama"
    pub provider: String,
    pub model: String,
    pub dimensions: usize,

    /// Texts per `embed_batch` call during rebuilds
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_batch_size() -> usize {
    100
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::from(&EmbeddingSettings::default())
    }
}

impl From<&EmbeddingSettings> for EmbeddingConfig {
    fn from(settings: &EmbeddingSettings) -> Self {
        Self {
            provider: settings.provider.clone(),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
            batch_size: default_batch_size(),
            endpoint: settings.endpoint.clone(),
        }
    }
}

impl EmbeddingConfig {
    /// Check that vectors produced under `recorded` are comparable with ours.
    ///
    /// Provider, model and dimensions must all agree. Batch size and endpoint
    /// do not affect the vectors.
    pub fn validate_consistency(&self, recorded: &Self) -> AppResult<()> {
        let mismatch = if self.provider != recorded.provider {
            Some(("Provider", self.provider.clone(), recorded.provider.clone()))
        } else if self.model != recorded.model {
            Some(("Model", self.model.clone(), recorded.model.clone()))
        } else if self.dimensions != recorded.dimensions {
            Some((
                "Dimension",
                self.dimensions.to_string(),
                recorded.dimensions.to_string(),
            ))
        } else {
            None
        };

        match mismatch {
            Some((what, configured, indexed)) => Err(AppError::Knowledge(format!(
                "{} mismatch: configured '{}', index built with '{}'",
                what, configured, indexed
            ))),
            None => Ok(()),
        }
    }
}
