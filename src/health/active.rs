//! Active health checking.
//!
//! # Responsibilities
//! - Own the backend registry (sole writer of liveness)
//! - Periodically probe every backend concurrently
//! - Expose the healthy subset in configuration order

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::future::join_all;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::sync::broadcast;
use tokio::time;
use url::Url;

use crate::config::schema::HealthCheckConfig;
use crate::load_balancer::backend::Backend;

pub struct HealthMonitor {
    backends: Vec<Arc<Backend>>,
    interval: Duration,
    probe_timeout: Duration,
    probe_path: String,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    /// Build the monitor from the static backend list. Exactly one
    /// record per configured backend, created here and never replaced.
    pub fn new(backend_urls: &[Url], config: &HealthCheckConfig) -> Self {
        let backends = backend_urls
            .iter()
            .map(|url| Arc::new(Backend::new(url.clone())))
            .collect();
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            backends,
            interval: Duration::from_secs(config.interval_secs),
            probe_timeout: Duration::from_secs(config.probe_timeout_secs),
            probe_path: config.path.clone(),
            client,
        }
    }

    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    /// Addresses of currently alive backends, in configuration order.
    pub fn healthy_backends(&self) -> Vec<Url> {
        self.backends
            .iter()
            .filter(|b| b.is_alive())
            .map(|b| b.url().clone())
            .collect()
    }

    /// Probe loop. Runs until the shutdown signal fires.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            path = %self.probe_path,
            backends = self.backends.len(),
            "health monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("health monitor stopping");
                    break;
                }
            }
        }
    }

    /// One probe round: all backends concurrently, barrier at the end.
    pub async fn check_all(&self) {
        let probes = self.backends.iter().map(|backend| async move {
            let alive = match backend.url().join(&self.probe_path) {
                Ok(probe_url) => self.probe(probe_url.as_str()).await,
                Err(e) => {
                    tracing::error!(url = %backend.url(), error = %e, "bad probe URL");
                    false
                }
            };
            backend.set_alive(alive);
        });
        join_all(probes).await;
    }

    async fn probe(&self, uri: &str) -> bool {
        let request = match Request::builder()
            .method("GET")
            .uri(uri)
            .header("user-agent", "lean-balancer-health-check")
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(uri = %uri, error = %e, "failed to build probe request");
                return false;
            }
        };

        match time::timeout(self.probe_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let alive = response.status() == StatusCode::OK;
                if !alive {
                    tracing::warn!(uri = %uri, status = %response.status(), "probe failed: non-200 status");
                }
                alive
            }
            Ok(Err(e)) => {
                tracing::warn!(uri = %uri, error = %e, "probe failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(uri = %uri, timeout_secs = self.probe_timeout.as_secs(), "probe failed: timeout");
                false
            }
        }
    }
}
