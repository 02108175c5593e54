//! Model serving core for the iris classifiers.
//!
//! Artifacts exported by the training notebook are loaded once into a [`ModelRegistry`]
//! and evaluated through a [`PredictionService`]. Nothing here is mutated after load.

pub mod artifact;
pub mod classifier;
pub mod error;
pub mod feature;
pub mod metadata;
pub mod prediction;
pub mod registry;
pub mod scaler;

pub use artifact::ArtifactStore;
pub use classifier::{Classifier, Classify};
pub use error::{ArtifactError, PredictionError};
pub use feature::{FEATURE_NAMES, FeatureVector};
pub use metadata::{ArtifactMetadata, ClassLabelSet, ModelDescriptor, ModelMetrics};
pub use prediction::{
    BatchItem, ClassProbabilities, MAX_BATCH_PREDICTIONS, PredictionRequest, PredictionResult,
    PredictionService,
};
pub use registry::{ModelRegistry, RegisteredModel};
pub use scaler::StandardScaler;

/// Absolute tolerance used when checking that a probability distribution sums to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;
