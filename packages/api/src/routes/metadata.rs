use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::{Json, Router, routing::get};
use iris_types::Value;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(get_metadata))
}

#[utoipa::path(
    get,
    path = "/metadata",
    tag = "models",
    responses(
        (status = 200, description = "Training metadata document, returned as stored")
    )
)]
#[tracing::instrument(name = "GET /metadata", skip(state))]
pub async fn get_metadata(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.registry.metadata().clone()))
}
