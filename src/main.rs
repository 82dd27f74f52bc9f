//! Rate-limiting HTTP load balancer.
//!
//! ```text
//!                         ┌────────────────────────────────────────────┐
//!                         │                LOAD BALANCER                │
//!     Client Request      │  ┌──────────┐   ┌─────────────────────┐    │
//!     ────────────────────┼─▶│ firewall │──▶│    path routing     │    │
//!                         │  └──────────┘   │ /reverse  /forward  │    │
//!                         │                 └─────┬─────────┬─────┘    │
//!                         │                       ▼         │          │
//!                         │              ┌──────────────┐   │          │
//!                         │              │load_balancer │   │          │
//!                         │              │ (round robin)│   │          │
//!                         │              └──────┬───────┘   │          │
//!                         │                     ▼           ▼          │
//!     Client Response     │              ┌──────────────────────┐      │
//!     ◀───────────────────┼──────────────│ pooled client + 3s   │◀─────┼── Backends
//!                         │              │ timeout dispatch     │      │
//!                         │              └──────────────────────┘      │
//!                         │  ┌────────────────────────────────────┐    │
//!                         │  │ health monitor (periodic probes)   │    │
//!                         │  │ admin API + /metrics (second port) │    │
//!                         │  └────────────────────────────────────┘    │
//!                         └────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use lean_balancer::admin::{admin_router, AdminState};
use lean_balancer::config::{load_config, ProxyConfig};
use lean_balancer::http::HttpServer;
use lean_balancer::lifecycle::Shutdown;
use lean_balancer::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(
    name = "lean-balancer",
    version,
    about = "Rate-limiting HTTP load balancer"
)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when absent.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.balancer.backends.len(),
        algorithm = %config.balancer.algorithm,
        "configuration loaded"
    );

    let metrics_handle = if config.observability.metrics_enabled {
        match metrics::install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "failed to install metrics recorder");
                None
            }
        }
    } else {
        None
    };

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config.clone());

    if config.admin.enabled {
        let admin_listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %admin_listener.local_addr()?, "admin API listening");

        let app = admin_router(AdminState {
            firewall: server.firewall(),
            monitor: server.monitor(),
            metrics: metrics_handle,
        });
        let mut rx = shutdown.subscribe();
        tokio::spawn(async move {
            let result = axum::serve(admin_listener, app)
                .with_graceful_shutdown(async move {
                    let _ = rx.recv().await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "admin server error");
            }
        });
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    server.run(listener, shutdown.subscribe()).await?;

    // The main listener is down; tell the admin listener and any
    // remaining background tasks to stop too.
    shutdown.trigger();
    tracing::info!("shutdown complete");
    Ok(())
}
