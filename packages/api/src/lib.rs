use axum::{Json, Router, http::Uri, routing::get};
use error::ApiError;
use serde::{Deserialize, Serialize};
use state::AppState;
use std::collections::BTreeMap;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};

mod routes;

pub mod error;
pub mod openapi;
pub mod state;

pub use axum;
pub use state::State;

pub fn construct_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .nest("/health", routes::health::routes())
        .nest("/models", routes::models::routes())
        .nest("/metadata", routes::metadata::routes())
        .nest("/predict", routes::predict::routes())
        .route("/openapi.json", get(openapi_json))
        .fallback(fallback)
        .with_state(state)
        .layer(CorsLayer::permissive())
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}

#[tracing::instrument(name = "GET /")]
async fn service_info() -> Json<ServiceInfo> {
    let endpoints = [
        ("predict", "/predict"),
        ("models", "/models"),
        ("metadata", "/metadata"),
        ("health", "/health"),
    ]
    .into_iter()
    .map(|(name, path)| (name.to_string(), path.to_string()))
    .collect();

    Json(ServiceInfo {
        message: "Iris Classification API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}

#[tracing::instrument(name = "GET /openapi.json")]
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}

#[tracing::instrument(name = "fallback", skip(uri), fields(path = %uri.path()))]
async fn fallback(uri: Uri) -> ApiError {
    crate::not_found!("No route for {}", uri.path())
}
