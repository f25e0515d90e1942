use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "moodcast-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Always ready: the service keeps working from the fallback store when the
/// remote is down, so an unreachable remote is reported, not fatal.
pub async fn readyz(State(state): State<AppState>) -> Json<Value> {
    let remote = if state.store.remote_reachable().await {
        "ok"
    } else {
        "unreachable"
    };

    Json(json!({
        "status": "ready",
        "checks": {
            "remote": remote,
            "fallback": "ok",
        },
    }))
}
