//! Credential Injector: swaps caller authorization for the upstream API key.
//!
//! Runs on every forwarded request regardless of route. Any inbound
//! `Authorization` header is dropped and `x-api-key` is set to the
//! configured credential, replacing a caller-supplied value.

use std::fmt;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::KeygateError;

pub static API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// The fixed secret sent upstream. Immutable once constructed.
#[derive(Clone)]
pub struct UpstreamCredential(HeaderValue);

impl UpstreamCredential {
    pub fn new(key: &str) -> Result<Self, KeygateError> {
        if key.is_empty() {
            return Err(KeygateError::MissingCredential);
        }
        let mut value = HeaderValue::from_str(key).map_err(|_| KeygateError::InvalidCredential)?;
        value.set_sensitive(true);
        Ok(Self(value))
    }
}

impl fmt::Debug for UpstreamCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UpstreamCredential(<redacted>)")
    }
}

pub fn apply(headers: &mut HeaderMap, credential: &UpstreamCredential) {
    headers.remove(header::AUTHORIZATION);
    headers.insert(API_KEY_HEADER.clone(), credential.0.clone());
}

pub async fn inject_credentials(
    State(credential): State<UpstreamCredential>,
    mut req: Request,
    next: Next,
) -> Response {
    apply(req.headers_mut(), &credential);
    next.run(req).await
}
