//! Read-only access to the exported artifact directory.
//!
//! Serialized objects are looked up by file stem: `<stem>.json` is decoded with serde_json,
//! `<stem>.msgpack` with MessagePack. JSON wins when both exist.

use crate::error::ArtifactError;
use iris_types::{Value, json};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    MessagePack,
}

impl ArtifactFormat {
    pub const ALL: [ArtifactFormat; 2] = [ArtifactFormat::Json, ArtifactFormat::MessagePack];

    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Json => "json",
            ArtifactFormat::MessagePack => "msgpack",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ArtifactError::MissingDirectory(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads a JSON document as-is.
    pub fn read_document(&self, file_name: &str) -> Result<(Value, PathBuf), ArtifactError> {
        let path = self.root.join(file_name);
        let bytes = read(&path)?;
        let value = json::from_slice(&bytes).map_err(|e| ArtifactError::decode(&path, e))?;
        Ok((value, path))
    }

    /// Finds the file backing `stem`, trying each known format in turn.
    pub fn resolve(&self, stem: &str) -> Result<(PathBuf, ArtifactFormat), ArtifactError> {
        ArtifactFormat::ALL
            .iter()
            .map(|format| {
                (
                    self.root.join(format!("{stem}.{}", format.extension())),
                    *format,
                )
            })
            .find(|(path, _)| path.is_file())
            .ok_or_else(|| {
                ArtifactError::Missing(
                    self.root
                        .join(format!("{stem}.{}", ArtifactFormat::Json.extension())),
                )
            })
    }

    /// Deserializes the artifact stored under `stem`.
    pub fn load<T: DeserializeOwned>(&self, stem: &str) -> Result<T, ArtifactError> {
        let (path, format) = self.resolve(stem)?;
        let bytes = read(&path)?;
        let value = match format {
            ArtifactFormat::Json => {
                json::from_slice(&bytes).map_err(|e| ArtifactError::decode(&path, e))?
            }
            ArtifactFormat::MessagePack => {
                rmp_serde::from_slice(&bytes).map_err(|e| ArtifactError::decode(&path, e))?
            }
        };
        tracing::debug!(path = %path.display(), "Loaded artifact");
        Ok(value)
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    std::fs::read(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => ArtifactError::Missing(path.to_path_buf()),
        _ => ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}
