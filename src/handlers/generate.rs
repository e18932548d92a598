//! Documentation generation trigger

use crate::handlers::AppState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::extract::State;
use serde_json::json;
use tracing::error;

/// POST /api-docs/generate - Run one synthesis and report the artifact list
pub async fn generate_documentation(State(state): State<AppState>) -> impl IntoResponse {
    match state.synthesizer.generate(&state.registry) {
        Ok(documentation) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Documentation generated successfully",
                "files": crate::docs::ARTIFACT_FILES,
                "documentation": documentation,
            })),
        ),
        Err(err) => {
            error!(error = %err, "Documentation generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": format!("Failed to generate documentation: {}", err),
                })),
            )
        }
    }
}
