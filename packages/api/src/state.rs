use iris_ml::{ArtifactError, ModelRegistry, PredictionService};
use std::path::Path;
use std::sync::Arc;

pub type AppState = Arc<State>;

/// Process-wide, read-only state. Built once before the listener accepts connections.
pub struct State {
    pub registry: Arc<ModelRegistry>,
    pub predictions: PredictionService,
}

impl State {
    pub fn new(registry: ModelRegistry) -> Self {
        let registry = Arc::new(registry);
        Self {
            predictions: PredictionService::new(registry.clone()),
            registry,
        }
    }

    pub fn load(artifact_dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        Ok(Self::new(ModelRegistry::load(artifact_dir)?))
    }
}
