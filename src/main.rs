// src/main.rs - Host process for the simulated printer dashboard
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::fmt::MakeWriter;

use printpulse::PrinterSimulator;
use printpulse::config::{self, Config, ConfigError};
use printpulse::web;

#[derive(Debug, Parser)]
#[command(name = "printpulse", version, about = "Simulated 3D printer telemetry host")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Listen address, overrides `server.bind`
    #[arg(long)]
    bind: Option<String>,
    /// Random seed, overrides `simulator.seed`
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    // The configured level is unknown until the file is read, so loading
    // logs through a temporary subscriber at the default level.
    let config = tracing::subscriber::with_default(bootstrap_subscriber(std::io::stdout), || {
        resolve_config(&cli)
    })?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(config.logging.max_level()?)
        .init();

    tracing::info!("Starting PrintPulse printer simulator");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &cli.config {
        tracing::info!("Loaded configuration from: {}", path.display());
    }

    let simulator = match config.simulator.seed {
        Some(seed) => {
            tracing::info!("Using fixed random seed {}", seed);
            PrinterSimulator::with_seed(seed)
        }
        None => PrinterSimulator::new(),
    };
    if config.simulator.autostart {
        simulator.start_simulation()?;
    }

    let app = web::create_router(simulator.clone());
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("Web API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    simulator.stop_simulation();
    tracing::info!("PrintPulse stopped");
    Ok(())
}

/// Subscriber used before the configured one is installed.
fn bootstrap_subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(writer)
        .finish()
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path).inspect_err(|e| {
            tracing::error!("Failed to load config from '{}': {}", path.display(), e);
        })?,
        None => Config::default(),
    };
    if let Some(bind) = &cli.bind {
        config.server.bind = bind.clone();
    }
    if let Some(seed) = cli.seed {
        config.simulator.seed = Some(seed);
    }
    config.validate().inspect_err(|e| {
        tracing::error!("Rejected configuration: {}", e);
    })?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
