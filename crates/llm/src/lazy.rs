//! Lazily initialised generative model handle.
//!
//! The client behind a [`LazyModel`] is created on the first call to
//! [`GenerativeModel::invoke`] and reused afterwards. Initialisation runs at
//! most once even when several tasks race for it.

use std::fmt;
use std::sync::Arc;

use docqa_core::AppResult;
use tokio::sync::OnceCell;

use crate::client::{LlmClient, LlmRequest};
use crate::factory::create_client;

/// Single text-in, text-out generative operation.
///
/// Classifiers and the answer synthesizer depend on this trait rather than on
/// a concrete provider, so tests can script responses.
#[async_trait::async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send one prompt and return the generated text.
    async fn invoke(&self, prompt: &str) -> AppResult<String>;
}

/// Provider settings needed to build a client on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub provider: String,
    pub model: String,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
}

impl ModelSettings {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            endpoint: None,
            api_key: None,
            temperature: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Sampling temperature for every call, provider default when `None`.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

type ClientInit = Box<dyn Fn() -> AppResult<Arc<dyn LlmClient>> + Send + Sync>;

/// Generative model handle that builds its client on first use.
pub struct LazyModel {
    model: String,
    temperature: Option<f32>,
    init: ClientInit,
    client: OnceCell<Arc<dyn LlmClient>>,
}

impl LazyModel {
    /// Handle that resolves the provider through [`create_client`] on first use.
    pub fn new(settings: ModelSettings) -> Self {
        let ModelSettings {
            provider,
            model,
            endpoint,
            api_key,
            temperature,
        } = settings;

        Self::with_initializer(model, temperature, move || {
            create_client(&provider, endpoint.as_deref(), api_key.as_deref())
        })
    }

    /// Handle with a custom client constructor.
    pub fn with_initializer<F>(model: impl Into<String>, temperature: Option<f32>, init: F) -> Self
    where
        F: Fn() -> AppResult<Arc<dyn LlmClient>> + Send + Sync + 'static,
    {
        Self {
            model: model.into(),
            temperature,
            init: Box::new(init),
            client: OnceCell::new(),
        }
    }

    /// Handle around an already constructed client.
    pub fn from_client(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        let fallback = Arc::clone(&client);
        Self {
            model: model.into(),
            temperature: None,
            init: Box::new(move || Ok(Arc::clone(&fallback))),
            client: OnceCell::new_with(Some(client)),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Whether the underlying client has been created yet.
    pub fn is_initialized(&self) -> bool {
        self.client.initialized()
    }

    async fn client(&self) -> AppResult<&Arc<dyn LlmClient>> {
        self.client
            .get_or_try_init(|| async {
                tracing::info!(model = %self.model, "Initializing generative model client");
                (self.init)()
            })
            .await
    }
}

#[async_trait::async_trait]
impl GenerativeModel for LazyModel {
    async fn invoke(&self, prompt: &str) -> AppResult<String> {
        let client = self.client().await?;

        let mut request = LlmRequest::new(prompt, self.model.as_str());
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        let response = client.complete(&request).await?;
        Ok(response.content)
    }
}

impl fmt::Debug for LazyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyModel")
            .field("model", &self.model)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
