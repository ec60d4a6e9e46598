//! Embedding providers for the index partitions.
//!
//! Each partition carries its own [`EmbeddingConfig`], so documents of
//! different formats can be embedded with different models.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
