//! `keygate validate`: load a config file the way `run` does and report on it.
//!
//! The file goes through the same [`ConfigSource`] as the gateway, so parse
//! and validation failures are exactly the ones startup would hit. A valid
//! file is reported as the resolved route table in match order, with the
//! effective per-route timeout and where the upstream credential will come
//! from.

use serde::Serialize;

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::model::Config;
use crate::config::{sources, ConfigSource, ConfigVersion};
use crate::error::KeygateError;
use crate::proxy::routing::RouteTable;

const API_KEY_ENV: &str = "UPSTREAM_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CredentialSource {
    Environment,
    File,
    Missing,
}

impl CredentialSource {
    /// Same precedence as `run`: the env var wins over the file.
    fn detect(config: &Config, env_key: Option<&str>) -> Self {
        if env_key.is_some_and(|key| !key.is_empty()) {
            Self::Environment
        } else if config.gateway.api_key.is_some() {
            Self::File
        } else {
            Self::Missing
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::Environment => "from UPSTREAM_API_KEY (overrides the file)",
            Self::File => "from gateway.api_key",
            Self::Missing => "not set, `keygate run` needs --api-key or UPSTREAM_API_KEY",
        }
    }
}

#[derive(Debug, Serialize)]
struct RouteReport {
    prefix: String,
    upstream: String,
    timeout_ms: u64,
}

#[derive(Debug, Serialize)]
struct Report {
    valid: bool,
    format: &'static str,
    version: String,
    prefix: String,
    credential: CredentialSource,
    routes: Vec<RouteReport>,
}

impl Report {
    fn new(
        format: &'static str,
        config: &Config,
        version: &ConfigVersion,
        credential: CredentialSource,
    ) -> Self {
        let routes = RouteTable::from_config(config)
            .entries()
            .iter()
            .map(|entry| RouteReport {
                prefix: if entry.prefix.is_empty() {
                    "/".into()
                } else {
                    entry.prefix.clone()
                },
                upstream: entry.base_url.clone(),
                timeout_ms: u64::try_from(entry.timeout.as_millis()).unwrap_or(u64::MAX),
            })
            .collect();

        Self {
            valid: true,
            format,
            version: version.short().to_string(),
            prefix: config.gateway.prefix.clone(),
            credential,
            routes,
        }
    }

    fn render_text(&self, path: &str) -> String {
        let mut lines = vec![
            format!("{path} is valid ({}, version {})", self.format, self.version),
            format!("  prefix:     {}", self.prefix),
            format!("  credential: {}", self.credential.describe()),
            "  routes, in match order:".to_string(),
        ];
        lines.extend(self.routes.iter().map(|route| {
            format!(
                "    {} -> {} ({}ms)",
                route.prefix, route.upstream, route.timeout_ms
            )
        }));
        lines.join("\n")
    }
}

pub async fn execute(args: &ValidateArgs) -> Result<(), KeygateError> {
    let path = args.config.display().to_string();
    let source = sources::for_path(&args.config)?;

    let (config, version) = match source.load().await {
        Ok(loaded) => loaded,
        Err(KeygateError::ConfigValidation { errors }) => {
            match args.format {
                ValidateFormat::Text => {
                    eprintln!("\u{2717} {path} has {} errors\n", errors.len());
                    for error in &errors {
                        eprintln!("{error}");
                    }
                }
                ValidateFormat::Json => {
                    println!("{}", serde_json::json!({ "valid": false, "errors": errors }));
                }
            }
            return Err(KeygateError::ConfigValidation { errors });
        }
        Err(e) => return Err(e),
    };

    let env_key = std::env::var(API_KEY_ENV).ok();
    let credential = CredentialSource::detect(&config, env_key.as_deref());
    let report = Report::new(source.name(), &config, &version, credential);

    match args.format {
        ValidateFormat::Text => println!("\u{2713} {}", report.render_text(&path)),
        ValidateFormat::Json => {
            let json = serde_json::to_string(&report).map_err(std::io::Error::from)?;
            println!("{json}");
        }
    }

    Ok(())
}
