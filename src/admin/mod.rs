//! Admin API served on its own listener.
//!
//! Exposes firewall and backend state plus the Prometheus scrape
//! endpoint. Unauthenticated: the listener is expected to bind an
//! operator-only address.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::health::active::HealthMonitor;
use crate::security::firewall::FirewallGuard;

use self::handlers::{api_health, block_ip, list_backends, list_blocked, render_metrics};

/// State injected into admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub firewall: Arc<FirewallGuard>,
    pub monitor: Arc<HealthMonitor>,
    /// Render handle for /metrics; `None` when metrics are disabled.
    pub metrics: Option<PrometheusHandle>,
}

pub fn admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/api/v1/health", get(api_health))
        .route("/api/v1/firewall", get(list_blocked))
        .route("/api/v1/firewall/block", post(block_ip))
        .route("/api/v1/backends", get(list_backends))
        .route("/metrics", get(render_metrics))
        .with_state(state)
}
