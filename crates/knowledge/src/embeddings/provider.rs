//! Embedding provider trait and factory.

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::providers::{OllamaProvider, TrigramProvider};
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Turns text into fixed-size vectors.
///
/// A partition's chunks and the queries searched against it must go through
/// the same provider and model.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;

    fn dimensions(&self) -> usize;

    /// One vector per input text, in input order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Provider for a partition's embedding config.
///
/// The Ollama provider probes the server and checks dimensions before returning.
pub async fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "trigram" => Ok(Arc::new(TrigramProvider::new(config.dimensions))),

        "ollama" => {
            let provider = OllamaProvider::new(config.clone()).await?;
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Knowledge(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_trigram_provider() {
        let config = EmbeddingConfig {
            dimensions: 128,
            ..EmbeddingConfig::default()
        };

        let provider = create_provider(&config).await.unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), 128);
    }

    #[tokio::test]
    async fn test_create_unknown_provider() {
        let config = EmbeddingConfig {
            provider: "unknown".to_string(),
            ..EmbeddingConfig::default()
        };

        let result = create_provider(&config).await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&EmbeddingConfig::default()).await.unwrap();

        let embedding = provider.embed("test text").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
