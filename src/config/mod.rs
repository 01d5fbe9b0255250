//! Configuration loading and validation.
//!
//! Defines the [`ConfigSource`] trait for pluggable config backends and
//! the [`ConfigVersion`] enum reported by the diagnostics endpoint.
//! Configuration is loaded exactly once at startup; the resulting route
//! table and upstream credential are immutable for the process lifetime.
//! Submodules provide the data model, validation logic, and concrete
//! file sources.

pub mod model;
pub mod sources;
pub mod validation;

use async_trait::async_trait;

use crate::error::KeygateError;
use model::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigVersion {
    Hash(String),
}

impl ConfigVersion {
    /// Short form suitable for logs and the health payload.
    #[must_use]
    pub fn short(&self) -> &str {
        match self {
            Self::Hash(h) => h.get(..8).unwrap_or(h),
        }
    }
}

// async_trait is required here because ConfigSource is used as Box<dyn ConfigSource>
// and native async fn in traits does not support dyn dispatch.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn load(&self) -> Result<(Config, ConfigVersion), KeygateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_version_truncates_hash() {
        let version = ConfigVersion::Hash("0123456789abcdef".into());
        assert_eq!(version.short(), "01234567");
    }

    #[test]
    fn short_version_keeps_short_hash() {
        let version = ConfigVersion::Hash("abc".into());
        assert_eq!(version.short(), "abc");
    }
}
