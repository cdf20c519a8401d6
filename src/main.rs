use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use uptimewatch::{logging, Args, Exporter, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(&args).context("invalid configuration")?;

    logging::init(&settings.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), ?settings, "starting uptimewatch");

    let exporter = Exporter::build(&settings).await?;
    info!(
        addr = %exporter.local_addr()?,
        interval_secs = settings.interval,
        "exporter ready"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl-C, shutting down");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                error!(error = %e, "failed to listen for Ctrl-C");
                // Keep the sender alive so the exporter keeps running.
                std::future::pending::<()>().await;
            }
        }
    });

    exporter.run(shutdown_rx).await
}
