use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness plus a local check that both providers are configured.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let generative = state.generative.health_check().await;
    let prescription = state.prescription.health_check().await;

    match generative.and(prescription) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "medassist-service",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Provider health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": "medassist-service",
                    "error": e.to_string()
                })),
            )
        }
    }
}
