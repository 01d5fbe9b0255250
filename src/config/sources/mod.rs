//! Concrete [`ConfigSource`](super::ConfigSource) implementations.
//!
//! Provides the file-based source, with YAML, JSON and TOML parsing gated by
//! feature flags. [`for_path`] is the single place that maps a file
//! extension to a deserializer.

pub mod file_source;

use sha2::{Digest, Sha256};

use crate::config::model::Config;
use crate::config::ConfigSource;
use crate::error::KeygateError;
use file_source::FileSource;

/// Build the file source matching a path's extension.
pub fn for_path(path: &std::path::Path) -> Result<Box<dyn ConfigSource>, KeygateError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let path = path.to_path_buf();

    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => Ok(Box::new(FileSource::new(path, "yaml", |content| {
            serde_yml::from_str::<Config>(content).map_err(Into::into)
        }))),

        #[cfg(feature = "json")]
        "json" => Ok(Box::new(FileSource::new(path, "json", |content| {
            serde_json::from_str::<Config>(content).map_err(Into::into)
        }))),

        #[cfg(feature = "toml")]
        "toml" => Ok(Box::new(FileSource::new(path, "toml", |content| {
            toml::from_str::<Config>(content).map_err(Into::into)
        }))),

        other => Err(KeygateError::UnsupportedFormat(other.to_string())),
    }
}

/// Compute a lowercase hex-encoded SHA-256 digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
