//! Configuration resolver service.
//!
//! # Architecture Overview
//!
//! ```text
//!   application caller                         operator
//!          │                                      │
//!          ▼                                      ▼
//!   ┌──────────────┐   start/reuse   ┌──────────────────┐
//!   │   Resolver   │────────────────▶│   RetryEngine    │
//!   │ bounded wait │◀────────────────│ loop per key     │
//!   └──────────────┘  value / fault  └────────┬─────────┘
//!          ▲                                  │ get(key) every backoff
//!          │ GET /admin/config/{key}          ▼
//!   ┌──────────────┐     PUT value    ┌──────────────────┐
//!   │  admin API   │─────────────────▶│      Store       │
//!   └──────────────┘                  │ memory | file    │
//!                                     └──────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use config_resolver::admin::{serve_admin, setup_admin_router, AdminState};
use config_resolver::config::{load_config_or_default, AdminConfig};
use config_resolver::lifecycle::{bootstrap, signals, Shutdown};
use config_resolver::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "config-resolver")]
#[command(about = "Resolves configuration values with a bounded wait and background retries")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "resolver.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config_or_default(&args.config)?;

    logging::init_logging(&config.observability)?;
    tracing::info!(config = %args.config.display(), "config-resolver v{} starting", env!("CARGO_PKG_VERSION"));
    if !args.config.exists() {
        tracing::warn!(config = %args.config.display(), "Config file not found, running with defaults");
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let services = bootstrap(&config)?;
    let shutdown = Shutdown::new();

    let admin_task = if config.admin.enabled {
        if config.admin.api_key == AdminConfig::PLACEHOLDER_KEY {
            tracing::warn!("Admin API key is the placeholder value, set admin.api_key");
        }
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let router = setup_admin_router(AdminState::new(services.resolver.clone(), &config.admin.api_key));
        Some(tokio::spawn(serve_admin(listener, router, shutdown.subscribe())))
    } else {
        tracing::info!("Admin API disabled");
        None
    };

    signals::wait_for_signal().await;
    shutdown.trigger(services.resolver.engine());

    if let Some(task) = admin_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Admin API exited with error"),
            Err(e) => tracing::error!(error = %e, "Admin API task panicked"),
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
