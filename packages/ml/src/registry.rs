use crate::FEATURE_NAMES;
use crate::artifact::ArtifactStore;
use crate::classifier::{Classifier, Classify};
use crate::error::{ArtifactError, PredictionError};
use crate::metadata::{ArtifactMetadata, ClassLabelSet, ModelDescriptor};
use crate::scaler::StandardScaler;
use iris_types::Value;
use std::path::Path;

pub const METADATA_FILE: &str = "metadata.json";
pub const SCALER_STEM: &str = "scaler";

/// A loaded classifier together with its declared metadata.
#[derive(Debug, Clone)]
pub struct RegisteredModel {
    pub descriptor: ModelDescriptor,
    pub classifier: Classifier,
}

/// Every artifact of the service, loaded once and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<RegisteredModel>,
    scaler: StandardScaler,
    labels: ClassLabelSet,
    metadata: Value,
}

impl ModelRegistry {
    /// Reads and cross-checks all artifacts in `dir`.
    ///
    /// Any missing, undecodable or inconsistent artifact aborts the load.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let store = ArtifactStore::open(dir.as_ref())?;

        let (raw, metadata_path) = store.read_document(METADATA_FILE)?;
        let metadata = ArtifactMetadata::from_value(raw, &metadata_path)?;
        let n_features = FEATURE_NAMES.len();
        let n_classes = metadata.target_names.len();

        let scaler: StandardScaler = store.load(SCALER_STEM)?;
        if scaler.n_features() != n_features {
            return Err(ArtifactError::Inconsistent(format!(
                "scaler expects {} features, service provides {n_features}",
                scaler.n_features()
            )));
        }

        let mut models = Vec::with_capacity(metadata.models.len());
        for (name, entry) in &metadata.models {
            let classifier: Classifier = store.load(&entry.artifact_stem(name))?;
            if classifier.n_features() != n_features {
                return Err(ArtifactError::Inconsistent(format!(
                    "model `{name}` expects {} features, service provides {n_features}",
                    classifier.n_features()
                )));
            }
            if classifier.n_classes() != n_classes {
                return Err(ArtifactError::Inconsistent(format!(
                    "model `{name}` predicts {} classes but metadata names {n_classes}",
                    classifier.n_classes()
                )));
            }
            tracing::info!(
                model = %name,
                kind = %classifier,
                requires_scaling = entry.requires_scaling,
                "Loaded model"
            );
            models.push(RegisteredModel {
                descriptor: ModelDescriptor {
                    name: name.clone(),
                    requires_scaling: entry.requires_scaling,
                    metrics: entry.metrics,
                },
                classifier,
            });
        }

        tracing::info!(
            dir = %store.root().display(),
            models = models.len(),
            classes = n_classes,
            "Model registry loaded"
        );

        Ok(Self {
            models,
            scaler,
            labels: metadata.target_names,
            metadata: metadata.raw,
        })
    }

    pub fn get(&self, name: &str) -> Result<&RegisteredModel, PredictionError> {
        self.models
            .iter()
            .find(|m| m.descriptor.name == name)
            .ok_or_else(|| PredictionError::UnknownModel {
                model: name.to_string(),
                available: self.names().map(str::to_string).collect(),
            })
    }

    /// Descriptors in registry order.
    pub fn list(&self) -> Vec<ModelDescriptor> {
        self.models.iter().map(|m| m.descriptor.clone()).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.descriptor.name.as_str())
    }

    pub fn labels(&self) -> &ClassLabelSet {
        &self.labels
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// The metadata document exactly as it was read.
    pub fn metadata(&self) -> &Value {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
