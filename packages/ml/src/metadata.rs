//! Typed view of `metadata.json`.
//!
//! The document is kept verbatim for `/metadata`; this module only extracts the parts the
//! registry needs. Unknown keys are ignored here and preserved in the raw document.

use crate::error::ArtifactError;
use iris_types::{Value, json};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Evaluation metrics recorded at training time. Never recomputed while serving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ModelMetrics {
    pub test_accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// Public description of a registered model, as listed by `/models`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ModelDescriptor {
    /// Model identifier, e.g. `decision_tree`
    pub name: String,
    /// Whether features are standardized before inference
    pub requires_scaling: bool,
    #[serde(flatten)]
    pub metrics: ModelMetrics,
}

/// Per-model entry of the `models` object in `metadata.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub requires_scaling: bool,
    pub metrics: ModelMetrics,
    /// File stem of the serialized classifier; defaults to `<name>_model`.
    #[serde(default)]
    pub artifact: Option<String>,
}

impl ModelEntry {
    pub fn artifact_stem(&self, name: &str) -> String {
        self.artifact
            .clone()
            .unwrap_or_else(|| format!("{name}_model"))
    }
}

/// Ordered class labels shared by every classifier; index `i` is class `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassLabelSet(Vec<String>);

impl TryFrom<Vec<String>> for ClassLabelSet {
    type Error = String;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        if labels.is_empty() {
            return Err("target_names is empty".to_string());
        }
        if labels.iter().any(|l| l.trim().is_empty()) {
            return Err("target_names contains an empty label".to_string());
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(format!("target_names contains `{label}` twice"));
            }
        }
        Ok(Self(labels))
    }
}

impl From<ClassLabelSet> for Vec<String> {
    fn from(labels: ClassLabelSet) -> Self {
        labels.0
    }
}

impl ClassLabelSet {
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Parsed `metadata.json`, keeping the raw document alongside.
#[derive(Debug, Clone)]
pub struct ArtifactMetadata {
    pub target_names: ClassLabelSet,
    pub feature_names: Vec<String>,
    /// Declared models in document order.
    pub models: Vec<(String, ModelEntry)>,
    pub raw: Value,
}

#[derive(Deserialize)]
struct MetadataDocument {
    target_names: ClassLabelSet,
    #[serde(default)]
    feature_names: Vec<String>,
    models: json::Map<String, Value>,
}

impl ArtifactMetadata {
    pub fn from_value(raw: Value, path: &Path) -> Result<Self, ArtifactError> {
        let document: MetadataDocument =
            json::from_value(raw.clone()).map_err(|e| ArtifactError::decode(path, e))?;

        if document.models.is_empty() {
            return Err(ArtifactError::decode(path, "no models declared"));
        }

        let mut models = Vec::with_capacity(document.models.len());
        for (name, entry) in document.models {
            let entry: ModelEntry = json::from_value(entry)
                .map_err(|e| ArtifactError::decode(path, format!("models.{name}: {e}")))?;
            models.push((name, entry));
        }

        Ok(Self {
            target_names: document.target_names,
            feature_names: document.feature_names,
            models,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iris_types::json::json;

    fn metrics() -> Value {
        json!({"test_accuracy": 1.0, "precision": 1.0, "recall": 1.0, "f1_score": 1.0})
    }

    #[test]
    fn test_models_keep_document_order() {
        let raw = json!({
            "target_names": ["a", "b"],
            "models": {
                "zeta": {"requires_scaling": false, "metrics": metrics()},
                "alpha": {"requires_scaling": true, "metrics": metrics(), "artifact": "alpha_v2"}
            }
        });
        let meta = ArtifactMetadata::from_value(raw, Path::new("metadata.json")).unwrap();
        let names: Vec<_> = meta.models.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(meta.models[0].1.artifact_stem("zeta"), "zeta_model");
        assert_eq!(meta.models[1].1.artifact_stem("alpha"), "alpha_v2");
    }

    #[test]
    fn test_duplicate_labels_are_rejected() {
        let raw = json!({
            "target_names": ["a", "a"],
            "models": {"m": {"requires_scaling": false, "metrics": metrics()}}
        });
        assert!(ArtifactMetadata::from_value(raw, Path::new("metadata.json")).is_err());
    }

    #[test]
    fn test_missing_metric_names_the_model() {
        let raw = json!({
            "target_names": ["a"],
            "models": {"m": {"requires_scaling": false, "metrics": {"test_accuracy": 0.9}}}
        });
        let err = ArtifactMetadata::from_value(raw, Path::new("metadata.json"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("models.m"), "{err}");
    }

    #[test]
    fn test_descriptor_flattens_metrics() {
        let descriptor = ModelDescriptor {
            name: "decision_tree".to_string(),
            requires_scaling: false,
            metrics: ModelMetrics {
                test_accuracy: 0.9,
                precision: 0.8,
                recall: 0.7,
                f1_score: 0.75,
            },
        };
        assert_eq!(
            json::to_value(&descriptor).unwrap(),
            json!({
                "name": "decision_tree",
                "requires_scaling": false,
                "test_accuracy": 0.9,
                "precision": 0.8,
                "recall": 0.7,
                "f1_score": 0.75
            })
        );
    }
}
