//! `keygate health`: check the health of a running instance.
//!
//! Sends `GET /health` through the same pooled client the gateway uses
//! (so `https://` instances work too) and prints a summary, or the raw
//! JSON with `--json`.

use std::time::Duration;

use http_body_util::{BodyExt, Full};

use crate::cli::HealthArgs;
use crate::error::KeygateError;
use crate::health::{HealthResponse, HEALTH_PATH};
use crate::server;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

fn request_failed(e: impl std::error::Error + Send + Sync + 'static) -> KeygateError {
    KeygateError::HttpRequest {
        source: Box::new(e),
    }
}

pub async fn execute(args: HealthArgs) -> Result<(), KeygateError> {
    let url = format!("{}{HEALTH_PATH}", args.url.trim_end_matches('/'));
    let uri: hyper::Uri = url
        .parse()
        .map_err(|e: hyper::http::uri::InvalidUri| KeygateError::UriParse {
            source: Box::new(e),
        })?;

    let req = hyper::Request::builder()
        .uri(uri)
        .body(Full::new(bytes::Bytes::new()))
        .map_err(request_failed)?;

    let client = server::build_http_client();
    let response = tokio::time::timeout(HEALTH_TIMEOUT, client.request(req))
        .await
        .map_err(|_| KeygateError::HttpRequest {
            source: format!("health check timed out after {}s", HEALTH_TIMEOUT.as_secs()).into(),
        })?
        .map_err(request_failed)?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(request_failed)?
        .to_bytes();

    if !status.is_success() {
        return Err(KeygateError::HealthCheckFailed(status));
    }

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    match serde_json::from_slice::<HealthResponse>(&body) {
        Ok(health) => print_summary(&args.url, &health),
        Err(e) => {
            eprintln!("Failed to parse health response: {e}");
            println!("{}", String::from_utf8_lossy(&body));
        }
    }

    Ok(())
}

fn print_summary(url: &str, health: &HealthResponse) {
    println!("\u{2713} keygate is healthy ({url})");
    println!("  version:        {}", health.version);
    println!("  uptime:         {}", format_uptime(health.uptime_seconds));
    println!(
        "  config:         {} @ {} (loaded {}s ago)",
        health.config.source, health.config.version, health.config.loaded_ago_seconds
    );
    println!(
        "  routes:         {} under '{}'",
        health.config.routes, health.config.prefix
    );
    println!(
        "  requests:       {} forwarded, {} failed, {} unrouted",
        health.stats.requests_forwarded,
        health.stats.requests_failed,
        health.stats.requests_unrouted
    );
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
