use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;

pub async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

pub async fn list_blocked(State(state): State<AdminState>) -> Json<Vec<String>> {
    Json(state.firewall.list_blocked())
}

#[derive(Deserialize)]
pub struct BlockRequest {
    pub ip: String,
}

pub async fn block_ip(
    State(state): State<AdminState>,
    Json(request): Json<BlockRequest>,
) -> Json<serde_json::Value> {
    state.firewall.block(&request.ip);
    tracing::info!(ip = %request.ip, "IP blocked via admin API");
    Json(serde_json::json!({ "message": "IP blocked", "ip": request.ip }))
}

#[derive(Serialize)]
pub struct BackendView {
    pub address: String,
    pub alive: bool,
    /// Seconds since the last probe, if one has completed.
    pub last_checked_secs_ago: Option<u64>,
}

pub async fn list_backends(State(state): State<AdminState>) -> Json<Vec<BackendView>> {
    let views = state
        .monitor
        .backends()
        .iter()
        .map(|backend| {
            let status = backend.status();
            BackendView {
                address: backend.url().to_string(),
                alive: status.alive,
                last_checked_secs_ago: status.last_checked.map(|t| t.elapsed().as_secs()),
            }
        })
        .collect();
    Json(views)
}

pub async fn render_metrics(State(state): State<AdminState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
