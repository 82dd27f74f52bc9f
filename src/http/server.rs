//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for the main listener
//! - Wire the firewall in front of every route
//! - Spawn the health monitor and firewall sweeper
//! - Serve with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;

use crate::config::ProxyConfig;
use crate::health::active::HealthMonitor;
use crate::load_balancer::round_robin::RoundRobin;
use crate::load_balancer::selector::BackendSelector;
use crate::load_balancer::BalancePolicy;
use crate::proxy::forward::forward_handler;
use crate::proxy::pool::ClientPool;
use crate::proxy::reverse::{reverse_handler, ROUTE_PREFIX};
use crate::security::firewall::{firewall_middleware, FirewallGuard};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub selector: Arc<BackendSelector>,
    pub monitor: Arc<HealthMonitor>,
    pub clients: Arc<ClientPool>,
    pub firewall: Arc<FirewallGuard>,
    pub upstream_timeout: Duration,
}

/// HTTP server for the load balancer's main listener.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    monitor: Arc<HealthMonitor>,
    firewall: Arc<FirewallGuard>,
}

impl HttpServer {
    /// Create a new server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let backend_urls: Vec<Url> = config
            .balancer
            .backends
            .iter()
            .filter_map(|raw| match Url::parse(raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(address = %raw, error = %e, "skipping invalid backend address");
                    None
                }
            })
            .collect();

        let monitor = Arc::new(HealthMonitor::new(&backend_urls, &config.health_check));
        let selector = Arc::new(BackendSelector::new(
            monitor.clone(),
            policy_from_name(&config.balancer.algorithm),
        ));
        let firewall = Arc::new(FirewallGuard::new(&config.firewall));

        let state = AppState {
            selector,
            monitor: monitor.clone(),
            clients: Arc::new(ClientPool::new()),
            firewall: firewall.clone(),
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            monitor,
            firewall,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let firewall = state.firewall.clone();
        let mut router = Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .route(ROUTE_PREFIX, any(reverse_handler))
            .route(&format!("{ROUTE_PREFIX}/{{*path}}"), any(reverse_handler))
            .route("/forward", any(forward_handler))
            .fallback(not_found_handler)
            .with_state(state);

        if config.firewall.enabled {
            router = router.layer(middleware::from_fn_with_state(firewall, firewall_middleware));
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Background tasks stop and the listener drains when `shutdown`
    /// fires (or on Ctrl+C).
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "load balancer listening");

        if self.config.health_check.enabled {
            tokio::spawn(self.monitor.clone().run(shutdown.resubscribe()));
        }
        if self.config.firewall.enabled {
            tokio::spawn(self.firewall.clone().run_sweeper(shutdown.resubscribe()));
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("proxy listener stopped");
        Ok(())
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn monitor(&self) -> Arc<HealthMonitor> {
        self.monitor.clone()
    }

    pub fn firewall(&self) -> Arc<FirewallGuard> {
        self.firewall.clone()
    }
}

fn policy_from_name(name: &str) -> Box<dyn BalancePolicy> {
    // Validation rejects unknown names at load time; a config built in
    // code falls back to round robin with a warning.
    match name {
        "round_robin" => Box::new(RoundRobin::new()),
        other => {
            tracing::warn!(algorithm = %other, "unknown balancing algorithm, using round_robin");
            Box::new(RoundRobin::new())
        }
    }
}

async fn root_handler() -> &'static str {
    "lean-balancer OK"
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn not_found_handler() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404 - Not Found")
}

/// Wait for Ctrl+C or the coordinated shutdown signal.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, shutting down");
        }
        _ = shutdown.recv() => {}
    }
}
