//! Serde data structures for the Keygate configuration file.
//!
//! Contains [`Config`] (the root), [`Gateway`] (prefix, upstream
//! credential, default timeout) and [`Route`]. All types derive
//! `Deserialize` with `deny_unknown_fields` for strict
//! parsing.

use serde::Deserialize;

const fn default_timeout() -> u64 {
    5000
}

fn default_prefix() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub gateway: Gateway,

    pub routes: Vec<Route>,
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Gateway {
    /// Gateway-level path prefix, stripped before forwarding.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Value of the `x-api-key` header sent to every upstream.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Gateway {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            api_key: None,
            timeout: default_timeout(),
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("prefix", &self.prefix)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Route {
    /// Path prefix matched against what follows the gateway prefix.
    pub path: String,

    /// Upstream base URL the remaining path is appended to.
    pub url: String,

    #[serde(default)]
    pub timeout: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_defaults_apply() {
        let config: Config = serde_json::from_str(
            r#"{"routes": [{"path": "/movie-api", "url": "http://localhost:8081"}]}"#,
        )
        .unwrap();
        assert_eq!(config.gateway.prefix, "/");
        assert_eq!(config.gateway.timeout, 5000);
        assert!(config.gateway.api_key.is_none());
        assert_eq!(config.routes[0].timeout, None);
    }

    #[test]
    fn unknown_fields_rejected() {
        let result = serde_json::from_str::<Config>(
            r#"{"routes": [{"path": "/a", "url": "http://a", "methods": ["GET"]}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let gateway = Gateway {
            api_key: Some("super-secret".into()),
            ..Gateway::default()
        };
        let rendered = format!("{gateway:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
