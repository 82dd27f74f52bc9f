//! Proxy engine subsystem.
//!
//! # Data Flow
//! ```text
//! Admitted request
//!     → reverse.rs (/reverse...): selector picks a healthy backend,
//!       URI and Host are rewritten, prefix stripped
//!     → forward.rs (/forward?target=): destination is taken verbatim
//!       from the caller
//!     → pool.rs: borrow an outbound client
//!     → dispatch with a bounded timeout
//!     → relay upstream status/headers/body, or translate the failure
//!       into an HTTP error
//!     → client returned to the pool on every exit path
//! ```
//!
//! # Design Decisions
//! - No inline retry and no alternate-backend failover: a backend that
//!   fails is excluded by the next health round, not re-tried here
//! - Every attempt, success or failure, logs method, path, status and
//!   elapsed time, and records the same as metrics

pub mod forward;
pub mod pool;
pub mod reverse;

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::time;

use crate::http::server::AppState;
use crate::observability::metrics;

/// Failures a proxy engine can surface to the client.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("No available backends")]
    NoHealthyBackend,

    #[error("Missing target parameter")]
    MissingTarget,

    #[error("Invalid target parameter: {0}")]
    InvalidTarget(String),

    #[error("Failed to build upstream request: {0}")]
    Rewrite(String),

    #[error("Error forwarding request: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("Error forwarding request: upstream timed out after {0:?}")]
    UpstreamTimeout(Duration),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NoHealthyBackend
            | ProxyError::Upstream(_)
            | ProxyError::UpstreamTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::MissingTarget | ProxyError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            ProxyError::Rewrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Send one rewritten request upstream through a pooled client.
///
/// The client goes back to the pool before the outcome is examined, so
/// the error paths release it too.
pub(crate) async fn send_upstream(
    state: &AppState,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let client = state.clients.acquire();
    let outcome = time::timeout(state.upstream_timeout, client.request(request)).await;
    state.clients.release(client);

    match outcome {
        Ok(Ok(upstream)) => {
            let (parts, body) = upstream.into_parts();
            Ok(Response::from_parts(parts, Body::new(body)))
        }
        Ok(Err(error)) => Err(ProxyError::Upstream(error)),
        Err(_) => Err(ProxyError::UpstreamTimeout(state.upstream_timeout)),
    }
}

/// Common tail of both engines: error translation, per-attempt log
/// line and metrics.
pub(crate) fn finish_attempt(
    mode: &'static str,
    method: &str,
    path: &str,
    started: Instant,
    result: Result<Response, ProxyError>,
) -> Response {
    let response = match result {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(mode, method, path, error = %error, "dispatch failed");
            error.into_response()
        }
    };

    let status = response.status().as_u16();
    metrics::record_request(method, path, status, started);
    tracing::info!(
        mode,
        method,
        path,
        status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request completed"
    );
    response
}
