use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Iris Classification API",
        version = "1.0.0",
        description = "Serves the iris species classifiers (decision tree and logistic regression) exported by the training notebook.",
        license(name = "MIT")
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "models", description = "Registered models and training metadata"),
        (name = "predict", description = "Species prediction")
    ),
    paths(
        crate::routes::health::health,
        crate::routes::models::list_models,
        crate::routes::metadata::get_metadata,
        crate::routes::predict::predict,
        crate::routes::predict::predict_batch,
    ),
    components(schemas(
        crate::routes::health::HealthResponse,
        crate::ServiceInfo,
        iris_ml::FeatureVector,
        iris_ml::PredictionRequest,
        iris_ml::PredictionResult,
        iris_ml::BatchItem,
        iris_ml::ModelDescriptor,
        iris_ml::ModelMetrics,
    ))
)]
pub struct ApiDoc;
