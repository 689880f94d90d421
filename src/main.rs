//! Edge Gateway
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                   EDGE GATEWAY                   │
//!    Client Request       │                                                  │
//!    ─────────────────────┼─▶ router ──┬─ /api/** ──▶ forwarder ─────────────┼──▶ Backend
//!                         │            │              (stream in/out)        │
//!                         │            │                                     │
//!                         │            └─ GET /** ──▶ session guard ─────────┼──▶ Backend
//!                         │                            │  /auth/status       │    /auth/status
//!                         │                            │  /settings/system   │    /settings/system
//!                         │                            ▼                     │
//!                         │                     advisory cache ──────────────┼──▶ Release source
//!                         │                     (≤ 1 check / hour)           │
//!    Client Response      │                            │                     │
//!    ◀────────────────────┼── 307 redirect | layout data JSON | relayed body │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use edge_gateway::lifecycle::startup;
use edge_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "edge-gateway")]
#[command(about = "Edge gateway: backend forwarding, session bootstrap and version advisory", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = startup::load(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-gateway starting");

    startup::run(config).await?;
    Ok(())
}
