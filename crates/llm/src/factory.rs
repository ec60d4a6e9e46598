//! LLM provider factory.
//!
//! Resolves a provider name from configuration to a client implementation.

use crate::client::LlmClient;
use crate::providers::{ollama::DEFAULT_OLLAMA_URL, OllamaClient};
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier (currently only "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `_api_key` - API key for hosted providers; local Ollama ignores it
///
/// # Errors
/// Returns `AppError::Llm` if the provider is unknown.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    _api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or(DEFAULT_OLLAMA_URL);
            tracing::debug!(base_url, "Creating Ollama client");
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        _ => Err(AppError::Llm(format!("Unknown provider: {}", provider))),
    }
}
