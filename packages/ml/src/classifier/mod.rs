//! Trained classifiers as exported by the training notebook.
//!
//! Both variants answer the same question: given one (possibly scaled) sample, what is the
//! probability of each class. The predicted class is the first class with the highest
//! probability, matching `argmax` semantics.

use crate::PROBABILITY_TOLERANCE;
use crate::error::PredictionError;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod decision_tree;
pub mod logistic;

pub use decision_tree::{DecisionTreeClassifier, TreeNode};
pub use logistic::{LogisticRegressionClassifier, MultiClass};

/// Inference capability shared by every classifier variant.
pub trait Classify {
    /// Number of input features the model expects.
    fn n_features(&self) -> usize;

    /// Number of classes in the output distribution.
    fn n_classes(&self) -> usize;

    /// Class probability distribution for a single sample.
    fn predict_proba(&self, x: ArrayView1<'_, f64>) -> Result<Array1<f64>, PredictionError>;

    /// Predicted class index together with the full distribution.
    fn predict(&self, x: ArrayView1<'_, f64>) -> Result<(usize, Array1<f64>), PredictionError> {
        if x.len() != self.n_features() {
            return Err(PredictionError::Inference(format!(
                "expected {} features, got {}",
                self.n_features(),
                x.len()
            )));
        }
        let proba = self.predict_proba(x)?;
        check_distribution(proba.view(), self.n_classes())?;
        let index = argmax(proba.view())
            .ok_or_else(|| PredictionError::Inference("Got an empty prediction".to_string()))?;
        Ok((index, proba))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
/// # Unified type for the serialized classifiers
pub enum Classifier {
    DecisionTree(DecisionTreeClassifier),
    LogisticRegression(LogisticRegressionClassifier),
}

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classifier::DecisionTree(_) => write!(f, "Decision Tree Classification"),
            Classifier::LogisticRegression(_) => write!(f, "Logistic Regression Classification"),
        }
    }
}

impl Classify for Classifier {
    fn n_features(&self) -> usize {
        match self {
            Classifier::DecisionTree(model) => model.n_features(),
            Classifier::LogisticRegression(model) => model.n_features(),
        }
    }

    fn n_classes(&self) -> usize {
        match self {
            Classifier::DecisionTree(model) => model.n_classes(),
            Classifier::LogisticRegression(model) => model.n_classes(),
        }
    }

    fn predict_proba(&self, x: ArrayView1<'_, f64>) -> Result<Array1<f64>, PredictionError> {
        match self {
            Classifier::DecisionTree(model) => model.predict_proba(x),
            Classifier::LogisticRegression(model) => model.predict_proba(x),
        }
    }
}

/// Index of the first maximal value, `None` for an empty view.
pub fn argmax(values: ArrayView1<'_, f64>) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Checks that `proba` is a valid distribution over `n_classes` classes.
pub fn check_distribution(
    proba: ArrayView1<'_, f64>,
    n_classes: usize,
) -> Result<(), PredictionError> {
    if proba.len() != n_classes {
        return Err(PredictionError::Inference(format!(
            "expected {} probabilities, got {}",
            n_classes,
            proba.len()
        )));
    }
    if proba.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(PredictionError::Inference(format!("invalid probabilities {proba}")));
    }
    let total = proba.sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(PredictionError::Inference(format!("probabilities sum to {total}")));
    }
    Ok(())
}
