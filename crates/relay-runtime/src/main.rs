//! # Warp Relay Runtime
//!
//! Runs the in-process warp devnet and prints its report as JSON.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialize tracing
//! 3. Validate configuration
//! 4. Install the Ctrl+C handler
//! 5. Run the devnet and print the report
//!
//! Exits non-zero if any expected message was not signed, delivered and
//! verified.

use anyhow::{Context, Result};
use relay_runtime::{devnet, init_tracing, RuntimeConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config.log).context("Failed to initialize tracing")?;
    config.validate().context("Invalid configuration")?;

    info!("===========================================");
    info!("  Warp Relay Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Ctrl+C received, shutting down");
                shutdown.cancel();
            }
        });
    }

    let report = devnet::run(&config, shutdown)
        .await
        .context("Devnet run failed")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize report")?
    );

    anyhow::ensure!(
        report.is_success(),
        "{} of {} messages signed and delivered",
        report.deliveries.iter().filter(|d| d.verified).count(),
        report.expected_messages
    );
    Ok(())
}
