use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Fitted per-feature standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScalerParams", into = "ScalerParams")]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

/// Serialized form of [`StandardScaler`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl TryFrom<ScalerParams> for StandardScaler {
    type Error = String;

    fn try_from(params: ScalerParams) -> Result<Self, Self::Error> {
        StandardScaler::new(params.mean, params.scale)
    }
}

impl From<StandardScaler> for ScalerParams {
    fn from(scaler: StandardScaler) -> Self {
        ScalerParams {
            mean: scaler.mean.to_vec(),
            scale: scaler.scale.to_vec(),
        }
    }
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, String> {
        if mean.is_empty() {
            return Err("scaler has no features".to_string());
        }
        if mean.len() != scale.len() {
            return Err(format!(
                "scaler mean has {} values but scale has {}",
                mean.len(),
                scale.len()
            ));
        }
        if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
            return Err(format!("scaler mean[{i}] is not finite"));
        }
        if let Some(i) = scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(format!("scaler scale[{i}] must be finite and non-zero"));
        }
        Ok(Self {
            mean: Array1::from(mean),
            scale: Array1::from(scale),
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> ArrayView1<'_, f64> {
        self.mean.view()
    }

    pub fn scale(&self) -> ArrayView1<'_, f64> {
        self.scale.view()
    }

    /// Standardize one sample. The caller guarantees the width matches [`Self::n_features`].
    pub fn transform(&self, x: ArrayView1<'_, f64>) -> Array1<f64> {
        (&x - &self.mean) / &self.scale
    }
}
