//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the dispatcher,
//! upstream credential, config metadata, stats, and uptime),
//! [`build_router`] for assembling the gateway pipeline, [`build_http_client`]
//! for the connection-pooled hyper client, and [`shutdown_signal`] for
//! SIGTERM / Ctrl+C handling.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::model::Config;
use crate::config::ConfigVersion;
use crate::health::{health_handler, HEALTH_PATH};
use crate::middleware::correlation;
use crate::middleware::credentials::{self, UpstreamCredential};
use crate::proxy::routing::RouteTable;
use crate::proxy::{self, Dispatcher};

/// Where the running configuration came from. Fixed at startup.
#[derive(Debug)]
pub struct LoadedConfig {
    pub version: ConfigVersion,
    pub source_name: String,
    pub prefix: String,
    pub loaded_at: Instant,
}

#[derive(Debug)]
pub struct Stats {
    pub forwarded: AtomicU64,
    pub failed: AtomicU64,
    pub unrouted: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            forwarded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            unrouted: AtomicU64::new(0),
        }
    }
}

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, http_body_util::Full<bytes::Bytes>>;

pub struct AppState {
    pub dispatcher: Dispatcher,
    pub credential: UpstreamCredential,
    pub config: LoadedConfig,
    pub start_time: Instant,
    pub stats: Stats,
}

impl AppState {
    /// Freeze the route table and credential for the lifetime of the process.
    #[must_use]
    pub fn new(
        config: &Config,
        version: ConfigVersion,
        source_name: impl Into<String>,
        credential: UpstreamCredential,
        http_client: HttpClient,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(RouteTable::from_config(config), http_client),
            credential,
            config: LoadedConfig {
                version,
                source_name: source_name.into(),
                prefix: config.gateway.prefix.clone(),
                loaded_at: Instant::now(),
            },
            start_time: Instant::now(),
            stats: Stats::new(),
        }
    }
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    // Several rustls crypto providers may be compiled in; pin `ring`.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https)
}

/// Assemble the pipeline: correlation, then credentials, then dispatch.
///
/// The correlation stage wraps the whole router, so `/health`, a 413 from
/// the body limit and every gateway error carry the identifier. `/health`
/// is only mounted when no route claims that path; otherwise it is
/// forwarded like any other request.
pub fn build_router(state: Arc<AppState>, max_body: usize) -> Router {
    let gateway: Router = Router::new()
        .fallback(proxy::forward_handler)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn_with_state(
                    state.credential.clone(),
                    credentials::inject_credentials,
                ))
                .layer(RequestBodyLimitLayer::new(max_body))
                .layer(DefaultBodyLimit::disable()),
        )
        .with_state(Arc::clone(&state));

    let mut router = Router::new();
    if serves_health(&state) {
        router = router.route(HEALTH_PATH, get(health_handler));
    } else {
        tracing::warn!(
            path = HEALTH_PATH,
            "a route covers the diagnostics path, forwarding it upstream"
        );
    }

    router
        .fallback_service(gateway)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(correlation::correlation_id)),
        )
        .with_state(state)
}

/// `true` unless the route table would forward the diagnostics path.
#[must_use]
pub fn serves_health(state: &AppState) -> bool {
    state.dispatcher.routes().resolve(HEALTH_PATH, None).is_none()
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
