//! Ollama embedding provider.
//!
//! One `/api/embeddings` call per text. Index builds retry failed calls
//! with exponential backoff under a request timeout. Query embeddings are a
//! single attempt with no timeout, so a failure surfaces to the caller at once.

use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use docqa_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(100);
const BUILD_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Text used to probe the server when the provider is created.
const PROBE_TEXT: &str = "connection check";

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    http: Client,
    url: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl OllamaProvider {
    /// Connect and check that the model returns vectors of the configured size.
    ///
    /// The server address comes from the partition config, then `OLLAMA_URL`,
    /// then the local default.
    pub async fn new(config: EmbeddingConfig) -> AppResult<Self> {
        let base_url = config
            .endpoint
            .clone()
            .or_else(|| std::env::var("OLLAMA_URL").ok())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let provider = Self {
            http: Client::new(),
            url: format!("{}{}", base_url.trim_end_matches('/'), EMBEDDING_ENDPOINT),
            model: config.model,
            dimensions: config.dimensions,
        };

        provider.probe().await?;
        Ok(provider)
    }

    async fn probe(&self) -> AppResult<()> {
        debug!(url = %self.url, model = %self.model, "Probing Ollama embeddings");

        self.embed_with_retry(PROBE_TEXT).await.map(|_| ()).map_err(|e| {
            AppError::Knowledge(format!(
                "Ollama embeddings unavailable at {} ({}). Is Ollama running? Try: ollama pull {}",
                self.url, e, self.model
            ))
        })
    }

    #[instrument(skip(self, text), fields(model = %self.model, len = text.len()))]
    async fn embed_with_retry(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut attempt = 1;
        loop {
            match self.request(text, Some(BUILD_REQUEST_TIMEOUT)).await {
                Ok(vector) => return Ok(vector),
                Err(e) if attempt < MAX_ATTEMPTS => {
                    let backoff = BASE_BACKOFF * 2u32.pow(attempt);
                    warn!(
                        "Embedding attempt {}/{} failed ({}), retrying in {:?}",
                        attempt, MAX_ATTEMPTS, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request(&self, text: &str, timeout: Option<Duration>) -> AppResult<Vec<f32>> {
        let mut request = self.http.post(&self.url).json(&EmbeddingRequest {
            model: &self.model,
            prompt: text,
        });
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Knowledge(format!("Ollama request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(AppError::Knowledge(format!(
                "Ollama API error ({}): {}",
                status, message
            )));
        }

        let EmbeddingResponse { embedding } = response
            .json()
            .await
            .map_err(|e| AppError::Knowledge(format!("Invalid Ollama embedding response: {}", e)))?;

        if embedding.len() != self.dimensions {
            return Err(AppError::Knowledge(format!(
                "Model '{}' returned {} dimensions, configured for {}",
                self.model,
                embedding.len(),
                self.dimensions
            )));
        }

        Ok(embedding)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Query-time embedding: one attempt, no retry.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(AppError::Knowledge("Cannot embed empty text".to_string()));
        }
        self.request(text, None).await
    }

    /// Index-build embedding. Blank texts get a zero vector instead of a request.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            if text.trim().is_empty() {
                vectors.push(vec![0.0; self.dimensions]);
            } else {
                vectors.push(self.embed_with_retry(text).await?);
            }
        }
        Ok(vectors)
    }
}
