//! Unified error types for Keygate.
//!
//! Defines [`KeygateError`] (startup and CLI failures), [`ProxyError`]
//! (per-request pipeline failures that become gateway-level responses),
//! and [`ValidationError`] for config validation failures. All use
//! `thiserror` or hand-written `Display` impls. Error messages include
//! contextual hints to guide the user toward a fix.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub route: String,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  route {}: {}: {}", self.route, self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum KeygateError {
    #[error("No config source found.\n\n  {hint}")]
    NoConfigSource { hint: String },

    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("No upstream API key configured.\n\n  Set gateway.api_key in the config file, pass --api-key, or export UPSTREAM_API_KEY.")]
    MissingCredential,

    #[error("Upstream API key is not a valid header value")]
    InvalidCredential,

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),
}

/// Failures raised while dispatching a single request.
///
/// Every variant converts into a gateway-level response with an empty
/// body. Upstream replies with error statuses are not represented here:
/// they are relayed as-is.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProxyError {
    #[error("no route matches '{path}'")]
    RouteNotFound { path: String },

    #[error("upstream {url} unreachable: {source}")]
    UpstreamUnreachable {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("upstream {url} did not respond within {timeout_ms}ms")]
    UpstreamTimeout { url: String, timeout_ms: u64 },

    #[error("could not build upstream request for {url}: {source}")]
    InvalidUpstreamRequest {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ProxyError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::UpstreamUnreachable { .. }
            | Self::UpstreamTimeout { .. }
            | Self::InvalidUpstreamRequest { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_not_found_is_404() {
        let err = ProxyError::RouteNotFound {
            path: "/nowhere".into(),
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn transport_failures_are_502() {
        let timeout = ProxyError::UpstreamTimeout {
            url: "http://upstream:8081/movies".into(),
            timeout_ms: 100,
        };
        assert_eq!(timeout.status(), StatusCode::BAD_GATEWAY);

        let unreachable = ProxyError::UpstreamUnreachable {
            url: "http://upstream:8081/movies".into(),
            source: "connection refused".into(),
        };
        assert_eq!(unreachable.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_error_display_includes_suggestion() {
        let err = ValidationError {
            route: "movie-api".into(),
            field: "path".into(),
            message: "path must start with '/'".into(),
            suggestion: Some("did you mean '/movie-api'?".into()),
        };
        assert_eq!(
            err.to_string(),
            "  route movie-api: path: path must start with '/' (did you mean '/movie-api'?)"
        );
    }
}
