use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Feature names in the column order the classifiers were trained on.
pub const FEATURE_NAMES: [&str; 4] = ["sepal_length", "sepal_width", "petal_length", "petal_width"];

/// Flower measurements in centimeters.
///
/// All four fields are required; serde rejects a missing or non-numeric field before
/// the value ever reaches the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(
    feature = "openapi",
    schema(example = json!({
        "sepal_length": 5.1,
        "sepal_width": 3.5,
        "petal_length": 1.4,
        "petal_width": 0.2
    }))
)]
pub struct FeatureVector {
    /// Sepal length in cm
    pub sepal_length: f64,
    /// Sepal width in cm
    pub sepal_width: f64,
    /// Petal length in cm
    pub petal_length: f64,
    /// Petal width in cm
    pub petal_width: f64,
}

impl FeatureVector {
    pub fn new(sepal_length: f64, sepal_width: f64, petal_length: f64, petal_width: f64) -> Self {
        Self {
            sepal_length,
            sepal_width,
            petal_length,
            petal_width,
        }
    }

    pub fn to_array(&self) -> Array1<f64> {
        Array1::from(vec![
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ])
    }
}

impl From<[f64; 4]> for FeatureVector {
    fn from([sepal_length, sepal_width, petal_length, petal_width]: [f64; 4]) -> Self {
        Self::new(sepal_length, sepal_width, petal_length, petal_width)
    }
}
