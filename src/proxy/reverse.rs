//! Reverse-mode proxy engine.
//!
//! The destination is chosen by the balancing policy. The inbound
//! routing prefix is stripped, the backend's authority replaces the
//! inbound one, and Host is rewritten to match; method, remaining
//! path, query, headers and body pass through unchanged.

use std::str::FromStr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{self, HeaderValue},
        uri::{Authority, PathAndQuery, Scheme},
        Request, Uri,
    },
    response::Response,
};
use url::Url;

use crate::http::server::AppState;
use crate::proxy::{finish_attempt, send_upstream, ProxyError};

/// Inbound routing prefix stripped before dispatch.
pub const ROUTE_PREFIX: &str = "/reverse";

pub async fn reverse_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let result = dispatch(&state, request).await;
    finish_attempt("reverse", &method, &path, started, result)
}

async fn dispatch(state: &AppState, request: Request<Body>) -> Result<Response, ProxyError> {
    let backend = state.selector.next().ok_or(ProxyError::NoHealthyBackend)?;
    let outbound = rewrite_for_backend(request, &backend)?;
    send_upstream(state, outbound).await
}

/// Point `request` at `backend`: strip the routing prefix, swap in the
/// backend's scheme and authority, set Host to match.
fn rewrite_for_backend(
    mut request: Request<Body>,
    backend: &Url,
) -> Result<Request<Body>, ProxyError> {
    let authority = authority_of(backend)?;

    let original = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let stripped = original.strip_prefix(ROUTE_PREFIX).unwrap_or(original);
    let rewritten = if stripped.is_empty() || stripped.starts_with('?') {
        format!("/{stripped}")
    } else {
        stripped.to_string()
    };

    let mut parts = request.uri().clone().into_parts();
    parts.scheme = Some(if backend.scheme() == "https" {
        Scheme::HTTPS
    } else {
        Scheme::HTTP
    });
    parts.authority =
        Some(Authority::from_str(&authority).map_err(|e| ProxyError::Rewrite(e.to_string()))?);
    parts.path_and_query =
        Some(PathAndQuery::from_str(&rewritten).map_err(|e| ProxyError::Rewrite(e.to_string()))?);
    *request.uri_mut() = Uri::from_parts(parts).map_err(|e| ProxyError::Rewrite(e.to_string()))?;

    let host = HeaderValue::from_str(&authority).map_err(|e| ProxyError::Rewrite(e.to_string()))?;
    request.headers_mut().insert(header::HOST, host);

    Ok(request)
}

fn authority_of(backend: &Url) -> Result<String, ProxyError> {
    match (backend.host_str(), backend.port()) {
        (Some(host), Some(port)) => Ok(format!("{host}:{port}")),
        (Some(host), None) => Ok(host.to_string()),
        (None, _) => Err(ProxyError::Rewrite(format!(
            "backend URL `{backend}` has no host"
        ))),
    }
}
