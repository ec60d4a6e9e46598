//! Ingest command handler.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{load_or_build_stores, IndexConfig, IngestMode};

/// Build or load the index partitions
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Rebuild both partitions even if they exist on disk
    #[arg(long)]
    pub force_rebuild: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        let index_config = IndexConfig::from_app_config(config);
        let (_, report) = load_or_build_stores(&index_config, self.force_rebuild).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        let verb = match report.mode {
            IngestMode::Built => "Built",
            IngestMode::Loaded => "Loaded",
        };
        println!(
            "{} index from {} documents: {} pdf chunks, {} non-pdf chunks ({:.2}s)",
            verb, report.documents, report.pdf_chunks, report.non_pdf_chunks, report.duration_secs
        );

        for skipped in &report.skipped {
            println!("  skipped {}: {}", skipped.file, skipped.reason);
        }

        Ok(())
    }
}
