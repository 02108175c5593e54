use crate::classifier::Classify;
use crate::error::PredictionError;
use crate::feature::FeatureVector;
use crate::registry::ModelRegistry;
use iris_types::{Value, json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Upper bound on the number of items accepted by one batch call.
pub const MAX_BATCH_PREDICTIONS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(
    feature = "openapi",
    schema(example = json!({
        "features": {
            "sepal_length": 5.1,
            "sepal_width": 3.5,
            "petal_length": 1.4,
            "petal_width": 0.2
        },
        "model": "decision_tree"
    }))
)]
pub struct PredictionRequest {
    pub features: FeatureVector,
    /// Model to use, e.g. `decision_tree` or `logistic_regression`
    pub model: String,
}

/// Per-class probabilities keyed by label, in class-index order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassProbabilities(#[serde(with = "label_map")] Vec<(String, f64)>);

impl ClassProbabilities {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(l, p)| (l.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for ClassProbabilities {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Helper-Module to serialize the label/probability pairs as a JSON object without losing order.
mod label_map {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(pairs: &[(String, f64)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(pairs.len()))?;
        for (label, probability) in pairs {
            map.serialize_entry(label, probability)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, f64)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = Vec<(String, f64)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of label to probability")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, f64>()? {
                    pairs.push(entry);
                }
                Ok(pairs)
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PredictionResult {
    /// Predicted class label
    pub prediction: String,
    /// Index of the predicted class
    pub prediction_index: usize,
    /// Probability of every class, keyed by label
    #[cfg_attr(feature = "openapi", schema(value_type = std::collections::HashMap<String, f64>))]
    pub probabilities: ClassProbabilities,
    /// Identifier of the model that produced the prediction
    pub model_used: String,
    /// Highest class probability
    pub confidence: f64,
}

/// Outcome of one item of a batch call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BatchItem {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PredictionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    fn from_outcome(outcome: Result<PredictionResult, PredictionError>) -> Self {
        match outcome {
            Ok(result) => BatchItem {
                success: true,
                result: Some(result),
                error: None,
            },
            Err(err) => BatchItem {
                success: false,
                result: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Turns feature vectors into predictions using the shared registry.
#[derive(Debug, Clone)]
pub struct PredictionService {
    registry: Arc<ModelRegistry>,
}

impl PredictionService {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Predicts the class of `features` with the model named `model`.
    ///
    /// Deterministic: the same input against the same artifacts always yields the same result.
    pub fn predict(
        &self,
        features: &FeatureVector,
        model: &str,
    ) -> Result<PredictionResult, PredictionError> {
        let entry = self.registry.get(model)?;

        let raw = features.to_array();
        let input = if entry.descriptor.requires_scaling {
            let scaled = self.registry.scaler().transform(raw.view());
            if scaled.iter().any(|v| !v.is_finite()) {
                return Err(PredictionError::InvalidRequest(format!(
                    "feature values {raw} overflow when standardized"
                )));
            }
            scaled
        } else {
            raw
        };

        let (index, proba) = entry.classifier.predict(input.view())?;

        let labels = self.registry.labels();
        let prediction = labels.get(index).ok_or_else(|| {
            PredictionError::Inference(format!(
                "Couldn't map prediction {index} to any of these classes {labels:?}"
            ))
        })?;
        let confidence = proba.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let probabilities = labels
            .iter()
            .zip(proba.iter())
            .map(|(label, p)| (label.to_string(), *p))
            .collect();

        Ok(PredictionResult {
            prediction: prediction.to_string(),
            prediction_index: index,
            probabilities,
            model_used: model.to_string(),
            confidence,
        })
    }

    pub fn predict_request(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictionError> {
        self.predict(&request.features, &request.model)
    }

    /// Evaluates every item on its own; one bad item never fails the others.
    pub fn predict_batch(&self, items: Vec<Value>) -> Vec<BatchItem> {
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let outcome = json::from_value::<PredictionRequest>(item)
                    .map_err(|e| PredictionError::InvalidRequest(e.to_string()))
                    .and_then(|request| self.predict_request(&request));
                if let Err(err) = &outcome {
                    if err.is_client_error() {
                        tracing::debug!(item = i, error = %err, "Batch item rejected");
                    } else {
                        tracing::error!(item = i, error = %err, "Batch item failed");
                    }
                }
                BatchItem::from_outcome(outcome)
            })
            .collect()
    }
}
