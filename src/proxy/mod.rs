//! Core HTTP forwarding: the dispatcher and its axum fallback handler.
//!
//! [`Dispatcher`] owns the immutable [`RouteTable`](routing::RouteTable)
//! and the pooled upstream client. It resolves the route, rewrites the
//! path, forwards method, headers and body bytes unchanged, and relays the
//! upstream status, headers and body back. Transport failures become
//! [`ProxyError`] values, which [`forward_handler`] turns into gateway-level
//! responses so they still flow back through the correlation stage.

pub mod headers;
pub mod routing;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use http_body_util::{BodyExt, Full};

use crate::error::ProxyError;
use crate::server::{AppState, HttpClient};
use routing::RouteTable;

pub struct Dispatcher {
    routes: RouteTable,
    client: HttpClient,
}

impl Dispatcher {
    #[must_use]
    pub fn new(routes: RouteTable, client: HttpClient) -> Self {
        Self { routes, client }
    }

    #[must_use]
    pub const fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Forward one request and return the upstream reply verbatim.
    ///
    /// Non-2xx upstream statuses are ordinary `Ok` responses. Only routing
    /// and transport failures produce an error.
    pub async fn dispatch(
        &self,
        method: Method,
        uri: &Uri,
        req_headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Response, ProxyError> {
        let path = uri.path();
        let matched = self
            .routes
            .resolve(path, uri.query())
            .ok_or_else(|| ProxyError::RouteNotFound {
                path: path.to_string(),
            })?;
        let upstream_url = matched.upstream_url;
        let timeout = matched.entry.timeout;

        let invalid = |source: Box<dyn std::error::Error + Send + Sync>| {
            ProxyError::InvalidUpstreamRequest {
                url: upstream_url.clone(),
                source,
            }
        };
        let target = url::Url::parse(&upstream_url).map_err(|e| invalid(Box::new(e)))?;
        let target_uri: hyper::Uri = upstream_url
            .parse()
            .map_err(|e: hyper::http::uri::InvalidUri| invalid(Box::new(e)))?;

        let mut request = hyper::Request::builder()
            .method(method.clone())
            .uri(target_uri)
            .body(Full::new(body))
            .map_err(|e| invalid(Box::new(e)))?;
        *request.headers_mut() = headers::build_forwarded_headers(req_headers, &target);

        tracing::info!(
            method = %method,
            path = %path,
            upstream = %upstream_url,
            "request routed"
        );

        let start = Instant::now();
        // The timeout covers both the response head and the body
        let exchange = async {
            let response = self.client.request(request).await.map_err(|e| {
                ProxyError::UpstreamUnreachable {
                    url: upstream_url.clone(),
                    source: Box::new(e),
                }
            })?;
            let (parts, body) = response.into_parts();
            let bytes = body
                .collect()
                .await
                .map_err(|e| ProxyError::UpstreamUnreachable {
                    url: upstream_url.clone(),
                    source: Box::new(e),
                })?
                .to_bytes();
            Ok::<_, ProxyError>((parts, bytes))
        };

        let (parts, bytes) = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| ProxyError::UpstreamTimeout {
                url: upstream_url.clone(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })??;

        tracing::info!(
            upstream = %upstream_url,
            status = parts.status.as_u16(),
            latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "upstream responded"
        );

        let mut resp_headers = parts.headers;
        headers::strip_response_hop_by_hop(&mut resp_headers, &method, parts.status);

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = parts.status;
        *response.headers_mut() = resp_headers;
        Ok(response)
    }
}

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    body: Bytes,
) -> Response {
    match state
        .dispatcher
        .dispatch(method.clone(), &uri, &req_headers, body)
        .await
    {
        Ok(response) => {
            state.stats.forwarded.fetch_add(1, Ordering::Relaxed);
            response
        }
        Err(e @ ProxyError::RouteNotFound { .. }) => {
            tracing::warn!(method = %method, path = %uri.path(), "no route matched");
            state.stats.unrouted.fetch_add(1, Ordering::Relaxed);
            e.into_response()
        }
        Err(e) => {
            tracing::error!(
                method = %method,
                path = %uri.path(),
                error = %e,
                "upstream request failed"
            );
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            e.into_response()
        }
    }
}
