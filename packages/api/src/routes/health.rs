use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::{Router, routing::get};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(health))
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub models_loaded: bool,
    pub version: String,
}

/// Liveness only. The process never serves without a loaded registry, so this never
/// has to look at it.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[tracing::instrument(name = "GET /health")]
pub async fn health() -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        models_loaded: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
