//! Order service binary.
//!
//! Runs either the user service or the order service, which enriches orders
//! with user details through a circuit-breaker-guarded lookup.
//!
//! ```text
//!     Client ──▶ order-service ──[circuit breaker]──▶ user-service
//!                     │                  │
//!                     ▼                  ▼
//!               order store     "Unknown User" fallback
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use order_service::config::{load_config, ConfigWatcher, ServiceConfig};
use order_service::lifecycle::signals::wait_for_termination;
use order_service::lifecycle::startup::{run_order_service, run_user_service};
use order_service::observability::{logging::init_logging, metrics::init_metrics};
use order_service::Shutdown;

#[derive(Parser)]
#[command(name = "order-service")]
#[command(about = "Order service with a resilient user lookup", long_about = None)]
struct Cli {
    /// TOML configuration file; watched for changes when given.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand, Clone, Copy)]
enum Role {
    /// Serve the user subsystem
    User,
    /// Serve orders, enriched through the user service
    Order,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "order-service starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        failure_threshold = config.resilience.failure_threshold,
        cool_down_ms = config.resilience.cool_down_ms,
        call_timeout_ms = config.resilience.call_timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_termination().await;
        signal_shutdown.trigger();
    });

    match cli.role {
        Role::User => run_user_service(config, listener, &shutdown).await?,
        Role::Order => {
            // Held for the lifetime of the service; dropping it stops watching.
            let (_watcher, updates) = match &cli.config {
                Some(path) => {
                    let (watcher, updates) = ConfigWatcher::new(path);
                    (Some(watcher.run()?), updates)
                }
                None => {
                    let (_tx, updates) = mpsc::unbounded_channel();
                    (None, updates)
                }
            };
            run_order_service(config, listener, updates, &shutdown).await?
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
