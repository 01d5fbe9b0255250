//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for structural
//! errors such as an empty route table, paths that do not start with `/`,
//! duplicate entries, malformed upstream URLs, and unusable API keys.
//! Returns a list of [`ValidationError`] values with per-field suggestions.

use axum::http::HeaderValue;
use url::Url;

use super::model::Config;
use crate::error::ValidationError;

/// Validate a path prefix. Returns `Ok(())` or a human-readable error.
pub fn validate_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("path cannot be empty".into());
    }
    if !path.starts_with('/') {
        return Err(format!("path must start with '/' (did you mean '/{path}'?)"));
    }
    if path.contains(['?', '#']) {
        return Err("path cannot contain a query string or fragment".into());
    }
    Ok(())
}

/// Validate an upstream base URL. Returns `Ok(())` or a human-readable error.
pub fn validate_target_url(url: &str) -> Result<(), String> {
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else if parsed.host_str().is_none() {
                Err(format!("'{url}' has no host"))
            } else if parsed.query().is_some() {
                Err("upstream URL cannot carry a query string".into())
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

/// Validate the upstream API key. Returns `Ok(())` or a human-readable error.
pub fn validate_api_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("api_key cannot be empty".into());
    }
    if HeaderValue::from_str(key).is_err() {
        return Err("api_key contains characters not allowed in a header value".into());
    }
    Ok(())
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(msg) = validate_path(&config.gateway.prefix) {
        errors.push(ValidationError {
            route: "(gateway)".into(),
            field: "gateway.prefix".into(),
            message: msg,
            suggestion: None,
        });
    }

    if let Some(ref key) = config.gateway.api_key {
        if let Err(msg) = validate_api_key(key) {
            errors.push(ValidationError {
                route: "(gateway)".into(),
                field: "gateway.api_key".into(),
                message: msg,
                suggestion: Some("omit it and pass --api-key or UPSTREAM_API_KEY instead".into()),
            });
        }
    }

    if config.gateway.timeout == 0 {
        errors.push(ValidationError {
            route: "(gateway)".into(),
            field: "gateway.timeout".into(),
            message: "timeout must be greater than zero".into(),
            suggestion: None,
        });
    }

    if config.routes.is_empty() {
        errors.push(ValidationError {
            route: "(root)".into(),
            field: "routes".into(),
            message: "at least one route must be defined".into(),
            suggestion: None,
        });
        return Err(errors);
    }

    let mut seen_paths = std::collections::HashSet::new();

    for (i, route) in config.routes.iter().enumerate() {
        let route_id = if route.path.is_empty() {
            format!("routes[{i}]")
        } else {
            route.path.clone()
        };

        if let Err(msg) = validate_path(&route.path) {
            errors.push(ValidationError {
                route: route_id.clone(),
                field: "path".into(),
                message: msg,
                suggestion: if !route.path.is_empty() && !route.path.starts_with('/') {
                    Some(format!("did you mean '/{}'?", route.path))
                } else {
                    None
                },
            });
        }

        // "/movie-api" and "/movie-api/" resolve to the same prefix
        let normalized = route.path.trim_end_matches('/');
        if !seen_paths.insert(normalized) {
            errors.push(ValidationError {
                route: route_id.clone(),
                field: "path".into(),
                message: "duplicate route path".into(),
                suggestion: None,
            });
        }

        if let Err(msg) = validate_target_url(&route.url) {
            errors.push(ValidationError {
                route: route_id.clone(),
                field: "url".into(),
                message: msg,
                suggestion: None,
            });
        }

        if route.timeout == Some(0) {
            errors.push(ValidationError {
                route: route_id,
                field: "timeout".into(),
                message: "timeout must be greater than zero".into(),
                suggestion: Some("remove it to inherit gateway.timeout".into()),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
