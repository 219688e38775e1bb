//! Rainfall Prediction Service - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.log_level).context("Failed to set tracing subscriber")?;

    info!("=== Rainfall Prediction Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Artifacts: sequence={} decomposition={}",
        config.artifacts.sequence_model.display(),
        config.artifacts.decomposition_model.display()
    );

    run_server(config).await
}
