use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::db;
use crate::state::AppState;

/// GET /health
/// Returns service status and database connectivity.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let connected = db::ping(&state.db).await;
    Json(json!({
        "status": "ok",
        "database": if connected { "connected" } else { "disconnected" },
        "version": env!("CARGO_PKG_VERSION"),
        "service": "interview-api"
    }))
}
