//! Liveness endpoint

use axum::response::Json;
use serde_json::{json, Value};

/// GET /health - Liveness check
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
