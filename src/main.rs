use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use deliveryfee::{AppState, DeliveryFeeConfig, VERSION, logging, web};

/// Weather-aware courier delivery fee service
#[derive(Debug, Parser)]
#[command(name = "deliveryfee", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured HTTP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Run one refresh cycle before serving requests
    #[arg(long)]
    refresh_on_start: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = DeliveryFeeConfig::load_from_path(cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init(&config.logging)?;
    info!("deliveryfee {} starting", VERSION);

    let state = AppState::from_config(&config).context("Failed to initialise service")?;

    if cli.refresh_on_start {
        let outcome = state.scheduler.refresh_now().await;
        info!("Initial refresh: {:?}", outcome);
    }
    if config.scheduler.start_on_boot {
        state.scheduler.start();
    }

    web::run(config.server.port, state).await
}
