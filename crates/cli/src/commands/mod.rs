//! Command handlers for the docqa CLI.

pub mod ask;
pub mod chat;
pub mod ingest;
pub mod stats;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use ingest::IngestCommand;
pub use stats::StatsCommand;

use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{load_or_build_stores, IndexConfig, IngestReport, RagPipeline};
use docqa_llm::{LazyModel, ModelSettings};
use docqa_prompt::PromptSet;
use std::sync::Arc;

/// Load or build the index, then wire up the question pipeline.
///
/// The generative model client is not created until the first question.
pub async fn build_pipeline(
    config: &AppConfig,
    force_rebuild: bool,
) -> AppResult<(RagPipeline, IngestReport)> {
    let index_config = IndexConfig::from_app_config(config);
    let (stores, report) = load_or_build_stores(&index_config, force_rebuild).await?;

    let prompts = PromptSet::load(&config.workspace)?;

    let settings = ModelSettings::new(&config.provider, &config.model)
        .with_endpoint(config.endpoint.clone())
        .with_api_key(config.api_key.clone())
        .with_temperature(config.temperature);
    let model = Arc::new(LazyModel::new(settings));

    Ok((RagPipeline::new(model, stores, prompts), report))
}
