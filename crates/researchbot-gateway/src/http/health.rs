use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::{AppState, SERVICE_NAME};

/// GET /: plain-text liveness banner.
pub async fn root_handler() -> String {
    format!("Sentient {SERVICE_NAME} is running! \u{1f916}")
}

/// GET /status: fixed status document for uptime pingers.
pub async fn status_handler() -> Json<Value> {
    Json(json!({
        "status": "online",
        "service": SERVICE_NAME,
    }))
}

/// GET /health: liveness probe, returns server metadata.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let channels = state
        .dispatcher
        .as_ref()
        .map(|d| d.store().channel_count())
        .unwrap_or(0);

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "discord": state.dispatcher.is_some(),
        "model": state.model,
        "channels": channels,
        "uptime_secs": state.started_at.elapsed().as_secs(),
    }))
}
