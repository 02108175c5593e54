use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::{Json, Router, routing::get};
use iris_ml::ModelDescriptor;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_models))
}

#[utoipa::path(
    get,
    path = "/models",
    tag = "models",
    responses(
        (status = 200, description = "Registered models with their training metrics", body = [ModelDescriptor])
    )
)]
#[tracing::instrument(name = "GET /models", skip(state))]
pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<Vec<ModelDescriptor>>, ApiError> {
    Ok(Json(state.registry.list()))
}
