use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

use skipped_tx_tracer::cli::Args;
use skipped_tx_tracer::rpc::ScrollClient;
use skipped_tx_tracer::stages;
use skipped_tx_tracer::utils::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    println!();
    info!("=========================== INITIALIZING ===========================");

    // Load config
    let config = match load_config(&args) {
        Ok(config) => {
            info!("Config loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load config: {}", e);
            return Err(e);
        }
    };

    let stage = config.stage;
    let paths = config.paths();
    info!("Network: {}, stage: {}", config.network, stage);
    info!("RPC URL: {}", config.rpc_url);

    // Dedup works purely on disk, so only dial the node when a stage needs it
    let client = if stage.runs_fetch() || stage.runs_trace() {
        Some(ScrollClient::connect(&config.rpc_url).await?)
    } else {
        None
    };

    if let Some(client) = client.as_ref().filter(|_| stage.runs_fetch()) {
        println!();
        info!("============================= FETCHING =============================");
        let summary = stages::dump_transactions(client, &paths).await?;
        info!("Fetched {} of {} skipped transactions", summary.written.len(), summary.reported);
    }

    if stage.runs_dedup() {
        println!();
        info!("=========================== DEDUPLICATING ==========================");
        let summary = stages::dedup_transactions(&paths, config.skip_malformed)?;
        info!(
            "Read {} transactions, dropped {} duplicates ({} inconsistent)",
            summary.read,
            summary.duplicates,
            summary.warnings.len()
        );
        if !summary.write_failures.is_empty() {
            error!("{} deduplicated transactions could not be written", summary.write_failures.len());
        }
    }

    if let Some(client) = client.as_ref().filter(|_| stage.runs_trace()) {
        println!();
        info!("============================= TRACING ==============================");
        let summary = stages::trace_transactions(client, &paths, config.skip_malformed).await?;
        if !summary.failed.is_empty() {
            error!("{} transactions could not be traced", summary.failed.len());
        }
    }

    println!();
    info!("=============================== DONE ===============================");
    Ok(())
}
