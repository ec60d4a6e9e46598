//! docqa CLI
//!
//! Main entry point for the docqa command-line tool.
//! Answers questions over a local document collection.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, IngestCommand, StatsCommand};
use docqa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// docqa - question answering over your documents
#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(about = "Question answering over a local document collection", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "DOCQA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Generative model provider
    #[arg(short, long, global = true, env = "DOCQA_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "DOCQA_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build or load the index partitions
    Ingest(IngestCommand),

    /// Ask a single question
    Ask(AskCommand),

    /// Interactive question loop
    Chat(ChatCommand),

    /// Show index statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("docqa starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;
    config.ensure_docqa_dir()?;

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
