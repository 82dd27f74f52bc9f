//! Forward-mode proxy engine.
//!
//! The caller names the destination through the `target` query
//! parameter; no backend selection happens and the target is used
//! verbatim.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{
        header::{self, HeaderValue},
        Request, Uri,
    },
    response::Response,
};
use serde::Deserialize;

use crate::http::server::AppState;
use crate::proxy::{finish_attempt, send_upstream, ProxyError};

#[derive(Debug, Deserialize)]
pub struct ForwardParams {
    #[serde(default)]
    target: Option<String>,
}

pub async fn forward_handler(
    State(state): State<AppState>,
    Query(params): Query<ForwardParams>,
    request: Request<Body>,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let result = dispatch(&state, params.target.as_deref(), request).await;
    finish_attempt("forward", &method, &path, started, result)
}

async fn dispatch(
    state: &AppState,
    target: Option<&str>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let target = match target {
        Some(t) if !t.is_empty() => t,
        _ => return Err(ProxyError::MissingTarget),
    };
    tracing::debug!(target, "forward dispatch");

    let outbound = rewrite_for_target(request, target)?;
    send_upstream(state, outbound).await
}

/// Point `request` at the caller-supplied target.
fn rewrite_for_target(
    mut request: Request<Body>,
    target: &str,
) -> Result<Request<Body>, ProxyError> {
    let uri: Uri = target
        .parse()
        .map_err(|_| ProxyError::InvalidTarget(target.to_string()))?;
    if uri.scheme().is_none() {
        return Err(ProxyError::InvalidTarget(target.to_string()));
    }
    let authority = uri
        .authority()
        .cloned()
        .ok_or_else(|| ProxyError::InvalidTarget(target.to_string()))?;

    *request.uri_mut() = uri;
    let host = HeaderValue::from_str(authority.as_str())
        .map_err(|_| ProxyError::InvalidTarget(target.to_string()))?;
    request.headers_mut().insert(header::HOST, host);

    Ok(request)
}
