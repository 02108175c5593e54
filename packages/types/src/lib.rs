//! Shared primitives for the iris prediction service crates.

pub use anyhow::{Context, Error, Result};
pub use serde_json::Value;

pub mod json {
    pub use serde_json::{
        Map, from_reader, from_slice, from_str, from_value, json, to_string, to_string_pretty,
        to_value, to_vec,
    };
}

/// Generate a new unique identifier, used for error reports and request correlation.
pub fn create_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
