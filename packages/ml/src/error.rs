use std::path::PathBuf;

/// Failures while reading the artifact directory. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("Artifact not found: {0}")]
    Missing(PathBuf),

    #[error("Failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode artifact {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("Inconsistent artifacts: {0}")]
    Inconsistent(String),
}

impl ArtifactError {
    pub(crate) fn decode(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        ArtifactError::Decode {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Failures while serving a single prediction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    /// The caller asked for a model that was never registered.
    #[error("Invalid model: {model}. Choose one of: {}", available.join(", "))]
    UnknownModel {
        model: String,
        available: Vec<String>,
    },

    /// The request itself could not be understood (used for batch items).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The classifier produced something that is not a valid distribution.
    #[error("Prediction error: {0}")]
    Inference(String),
}

impl PredictionError {
    /// Whether the failure was caused by the caller rather than by the loaded artifacts.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PredictionError::Inference(_))
    }
}
