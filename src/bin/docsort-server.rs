use anyhow::{Context, Result};
use clap::Parser;
use docsort_api::AppState;
use docsort_extract::{CommandTools, Extractor, TextTools};
use docsort_metrics::{MetricsService, TracingService};
use docsort_models::Config;
use docsort_store::{DocumentStore, UploadDir};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "docsort-server")]
#[command(about = "Upload, OCR and categorize documents")]
struct Args {
    /// TOML config file; missing files fall back to defaults
    #[arg(long, env = "DOCSORT_CONFIG", default_value = "configs/default.toml")]
    config: PathBuf,
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(err) => warn!("Unable to listen for shutdown signal: {}", err),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(Some(&args.config)).context("failed to load configuration")?;
    TracingService::init(&config.logging).context("failed to initialise logging")?;

    info!("Starting DocSort server");
    info!("Configuration loaded: {:?}", config);

    let uploads = Arc::new(UploadDir::new(&config.data.upload_dir).await?);
    info!("Upload directory: {}", uploads.root().display());

    let store = Arc::new(DocumentStore::connect(&config.data.db_url).await?);
    info!("Database connected: {}", config.data.db_url);

    let tools = Arc::new(CommandTools::new(config.ocr.clone()));
    TracingService::log_tools_probe(&tools.probe().await.map_err(|e| format!("{e:#}")));
    let extractor = Arc::new(Extractor::new(tools, config.ocr.max_concurrent_jobs));

    let metrics = Arc::new(MetricsService::new()?);

    let state = AppState::new(config, store, extractor, uploads, metrics);
    docsort_api::start_server(state, shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;

    info!("DocSort server shutdown complete");
    Ok(())
}
