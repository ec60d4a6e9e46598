//! LLM integration crate for docqa.
//!
//! This crate provides a provider-agnostic abstraction for interacting with
//! generative models, plus a lazily initialised model handle shared by the
//! query classifiers and the answer synthesizer.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//!
//! # Example
//! ```no_run
//! use docqa_llm::{GenerativeModel, LazyModel, ModelSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let model = LazyModel::new(ModelSettings::new("ollama", "gemma3"));
//! let answer = model.invoke("Hello, world!").await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod lazy;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use lazy::{GenerativeModel, LazyModel, ModelSettings};
pub use providers::OllamaClient;
