//! diagramd: the diagram lookup daemon.
//!
//! Serves [`DiagramAggregator`](diagram_lookup::DiagramAggregator) lookups
//! over HTTP, sharing one result cache across all clients.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use diagram_lookup::server::config::Config;

/// Ranked educational diagram lookup service.
#[derive(Parser)]
#[command(name = "diagramd")]
#[command(version = diagram_lookup::PKG_VERSION)]
#[command(about = "Diagram lookup daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "DIAGRAMD_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Override the bind address from the config file.
    #[arg(short, long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("diagram_lookup=info,diagramd=info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref())?;
    let aggregator = config.build_aggregator()?;

    // Parse address
    let address = args.address.unwrap_or_else(|| config.server.address.clone());
    let addr: SocketAddr = address.parse().map_err(|e| {
        diagram_lookup::DiagramError::Configuration(format!("Invalid address: {e}"))
    })?;

    info!(
        version = diagram_lookup::version_string(),
        %addr,
        refiner = ?config.refiner.kind,
        "diagramd starting"
    );

    let app = diagram_lookup::server::router(Arc::new(aggregator));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
