//! `keygate run`: start the gateway.
//!
//! Loads configuration once from a file source, applies CLI/env
//! overrides, freezes the route table and upstream credential into
//! [`AppState`], and serves until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::model::Config;
use crate::config::{sources, ConfigSource};
use crate::error::KeygateError;
use crate::logging;
use crate::middleware::credentials::UpstreamCredential;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), KeygateError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let source = resolve_file_source(args.config.as_deref()).await?;
    let (mut config, version) = source.load().await?;

    apply_overrides(&mut config, &args);
    let credential = resolve_credential(&config)?;

    let route_count = config.routes.len();
    let state = Arc::new(AppState::new(
        &config,
        version,
        source.name(),
        credential,
        server::build_http_client(),
    ));

    let router = server::build_router(state, args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        prefix = %config.gateway.prefix,
        routes = route_count,
        timeout_ms = config.gateway.timeout,
        "keygate started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("keygate stopped");
    Ok(())
}

/// CLI flags and env vars win over the file.
fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(timeout) = args.timeout {
        config.gateway.timeout = timeout;
    }
    if let Some(ref key) = args.api_key {
        config.gateway.api_key = Some(key.clone());
    }
}

fn resolve_credential(config: &Config) -> Result<UpstreamCredential, KeygateError> {
    config
        .gateway
        .api_key
        .as_deref()
        .ok_or(KeygateError::MissingCredential)
        .and_then(UpstreamCredential::new)
}

async fn resolve_file_source(
    explicit: Option<&std::path::Path>,
) -> Result<Box<dyn ConfigSource>, KeygateError> {
    if let Some(path) = explicit {
        return sources::for_path(path);
    }

    // Auto-detect in current directory
    let candidates = ["keygate.yaml", "keygate.yml", "keygate.json", "keygate.toml"];

    for name in &candidates {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return sources::for_path(&path);
        }
    }

    Err(KeygateError::NoConfigSource {
        hint: "Provide --config <file> or create ./keygate.yaml.".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::{Cli, Commands};
    use crate::config::model::{Gateway, Route};

    fn config(api_key: Option<&str>) -> Config {
        Config {
            gateway: Gateway {
                api_key: api_key.map(String::from),
                ..Gateway::default()
            },
            routes: vec![Route {
                path: "/movie-api".into(),
                url: "http://localhost:8081".into(),
                timeout: None,
            }],
        }
    }

    fn run_args(extra: &[&str]) -> RunArgs {
        let argv = ["keygate", "run"].iter().chain(extra.iter()).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Commands::Run(args)) => *args,
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn cli_key_overrides_file_key() {
        let mut cfg = config(Some("from-file"));
        apply_overrides(&mut cfg, &run_args(&["--api-key", "from-cli"]));
        assert_eq!(cfg.gateway.api_key.as_deref(), Some("from-cli"));
    }

    #[test]
    fn cli_timeout_overrides_default() {
        let mut cfg = config(Some("key"));
        apply_overrides(&mut cfg, &run_args(&["--timeout", "1500"]));
        assert_eq!(cfg.gateway.timeout, 1500);
    }

    #[test]
    fn missing_key_is_an_error() {
        assert!(matches!(
            resolve_credential(&config(None)),
            Err(KeygateError::MissingCredential)
        ));
    }

    #[test]
    fn configured_key_builds_credential() {
        assert!(resolve_credential(&config(Some("some-api-key"))).is_ok());
    }
}
