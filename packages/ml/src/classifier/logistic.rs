use super::Classify;
use crate::error::PredictionError;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// How per-class scores are turned into probabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    /// Softmax over all class scores.
    #[default]
    Multinomial,
    /// Independent logistic per class, renormalized to sum to one.
    Ovr,
}

/// Linear classifier: `scores = coef · x + intercept`, one row of `coef` per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LogisticRegressionParams", into = "LogisticRegressionParams")]
pub struct LogisticRegressionClassifier {
    coef: Array2<f64>,
    intercept: Array1<f64>,
    multi_class: MultiClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogisticRegressionParams {
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    #[serde(default)]
    multi_class: MultiClass,
}

impl TryFrom<LogisticRegressionParams> for LogisticRegressionClassifier {
    type Error = String;

    fn try_from(params: LogisticRegressionParams) -> Result<Self, Self::Error> {
        LogisticRegressionClassifier::new(params.coef, params.intercept, params.multi_class)
    }
}

impl From<LogisticRegressionClassifier> for LogisticRegressionParams {
    fn from(model: LogisticRegressionClassifier) -> Self {
        LogisticRegressionParams {
            coef: model.coef.outer_iter().map(|row| row.to_vec()).collect(),
            intercept: model.intercept.to_vec(),
            multi_class: model.multi_class,
        }
    }
}

impl LogisticRegressionClassifier {
    pub fn new(
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
        multi_class: MultiClass,
    ) -> Result<Self, String> {
        let n_classes = coef.len();
        let n_features = coef.first().map(Vec::len).unwrap_or(0);
        if n_classes == 0 || n_features == 0 {
            return Err("logistic regression has an empty coefficient matrix".to_string());
        }
        if let Some(row) = coef.iter().position(|r| r.len() != n_features) {
            return Err(format!(
                "coefficient row {row} has {} values, expected {n_features}",
                coef[row].len()
            ));
        }
        if intercept.len() != n_classes {
            return Err(format!(
                "intercept has {} values but there are {n_classes} classes",
                intercept.len()
            ));
        }
        if coef.iter().flatten().chain(&intercept).any(|v| !v.is_finite()) {
            return Err("logistic regression parameters must be finite".to_string());
        }

        let flat: Vec<f64> = coef.into_iter().flatten().collect();
        let coef = Array2::from_shape_vec((n_classes, n_features), flat)
            .map_err(|e| format!("invalid coefficient matrix: {e}"))?;
        Ok(Self {
            coef,
            intercept: Array1::from(intercept),
            multi_class,
        })
    }

    pub fn multi_class(&self) -> MultiClass {
        self.multi_class
    }

    fn decision_function(&self, x: ArrayView1<'_, f64>) -> Array1<f64> {
        self.coef.dot(&x) + &self.intercept
    }
}

fn softmax(scores: Array1<f64>) -> Array1<f64> {
    let max = scores.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let exp = scores.mapv(|s| (s - max).exp());
    let total = exp.sum();
    exp / total
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classify for LogisticRegressionClassifier {
    fn n_features(&self) -> usize {
        self.coef.ncols()
    }

    fn n_classes(&self) -> usize {
        self.coef.nrows()
    }

    fn predict_proba(&self, x: ArrayView1<'_, f64>) -> Result<Array1<f64>, PredictionError> {
        if x.len() != self.n_features() {
            return Err(PredictionError::Inference(format!(
                "expected {} features, got {}",
                self.n_features(),
                x.len()
            )));
        }
        let scores = self.decision_function(x);
        // Parameters are finite, so a non-finite score comes from the magnitude of the input.
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(PredictionError::InvalidRequest(format!(
                "feature values {x} are too large for the model to evaluate"
            )));
        }
        let proba = match self.multi_class {
            MultiClass::Multinomial => softmax(scores),
            MultiClass::Ovr => {
                let raw = scores.mapv(sigmoid);
                let total = raw.sum();
                if total <= 0.0 {
                    return Err(PredictionError::Inference(
                        "one-vs-rest scores vanished".to_string(),
                    ));
                }
                raw / total
            }
        };
        Ok(proba)
    }
}
