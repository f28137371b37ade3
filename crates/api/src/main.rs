//! AstroVision detection server - Main Entry Point

use api::{init_logging, run_server, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;
    init_logging(config.log_json)?;

    info!("=== AstroVision v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Loading detection models...");

    run_server(config).await?;

    Ok(())
}
