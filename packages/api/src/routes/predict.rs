use crate::bad_request;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, routing::post};
use iris_ml::{BatchItem, MAX_BATCH_PREDICTIONS, PredictionRequest, PredictionResult};
use iris_types::Value;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(predict))
        .route("/batch", post(predict_batch))
}

#[utoipa::path(
    post,
    path = "/predict",
    tag = "predict",
    request_body = PredictionRequest,
    responses(
        (status = 200, description = "Predicted species with class probabilities", body = PredictionResult),
        (status = 400, description = "Malformed JSON or unknown model"),
        (status = 422, description = "Missing or non-numeric feature"),
        (status = 500, description = "The classifier failed on a well-formed input")
    )
)]
#[tracing::instrument(name = "POST /predict", skip(state, payload))]
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let Json(request) = payload?;
    let result = state.predictions.predict_request(&request)?;
    tracing::debug!(
        model = %result.model_used,
        prediction = %result.prediction,
        confidence = result.confidence,
        "Prediction served"
    );
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/predict/batch",
    tag = "predict",
    request_body = [PredictionRequest],
    responses(
        (status = 200, description = "One outcome per request item, in request order", body = [BatchItem]),
        (status = 400, description = "Body is not a JSON array or exceeds the batch limit")
    )
)]
#[tracing::instrument(name = "POST /predict/batch", skip(state, payload))]
pub async fn predict_batch(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Value>>, JsonRejection>,
) -> Result<Json<Vec<BatchItem>>, ApiError> {
    let Json(items) = payload?;
    if items.len() > MAX_BATCH_PREDICTIONS {
        return Err(bad_request!(
            "Batch of {} items exceeds the limit of {}",
            items.len(),
            MAX_BATCH_PREDICTIONS
        ));
    }
    Ok(Json(state.predictions.predict_batch(items)))
}
