//! Stats command handler.
//!
//! Shows what the last index build produced.

use clap::Args;
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_knowledge::ingest::Manifest;
use docqa_knowledge::{IndexConfig, Partition};

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let index_config = IndexConfig::from_app_config(config);
        let manifest = Manifest::read(&index_config.index_dir)?.ok_or_else(|| {
            AppError::Knowledge(format!(
                "No index found in {:?}. Run 'docqa ingest' first.",
                index_config.index_dir
            ))
        })?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&manifest)?);
            return Ok(());
        }

        println!("Index: {}", index_config.index_dir.display());
        println!("Built: {}", manifest.built_at.to_rfc3339());
        println!("Documents: {}", manifest.documents);

        for partition in Partition::ALL {
            let entry = manifest.partition(partition);
            let path = index_config.store_path(partition);
            let on_disk = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

            println!(
                "  {:<8} {:>6} chunks  {}/{} ({} dims)  {} bytes",
                partition.as_str(),
                entry.chunks,
                entry.embedding.provider,
                entry.embedding.model,
                entry.embedding.dimensions,
                on_disk
            );
        }

        Ok(())
    }
}
