//! Correlation Filter: assigns or propagates `x-correlation-id`.
//!
//! The first inbound value is reused verbatim (no format checks); when the
//! header is absent a lowercase hyphenated UUID v4 is generated. The chosen
//! value replaces whatever the caller sent on the forwarded request, and is
//! set on the response unconditionally, so gateway-level errors carry it
//! too. A tracing span tagged with the identifier wraps the rest of the
//! pipeline.

use std::fmt;

use axum::extract::Request;
use axum::http::header::InvalidHeaderValue;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::Instrument;
use uuid::Uuid;

pub static CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

/// The identifier bound to one request/response pair.
///
/// Also stored in request extensions for handlers further down the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(HeaderValue);

impl CorrelationId {
    /// A fresh lowercase hyphenated UUID v4.
    pub fn generate() -> Result<Self, InvalidHeaderValue> {
        let mut buf = Uuid::encode_buffer();
        let id = Uuid::new_v4().hyphenated().encode_lower(&mut buf);
        HeaderValue::from_str(id).map(Self)
    }

    /// First `x-correlation-id` value if present (even an empty one), a
    /// fresh one otherwise.
    pub fn resolve(headers: &HeaderMap) -> Result<Self, InvalidHeaderValue> {
        match headers.get(&CORRELATION_ID_HEADER) {
            Some(value) => Ok(Self(value.clone())),
            None => Self::generate(),
        }
    }

    #[must_use]
    pub const fn header_value(&self) -> &HeaderValue {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.0.as_bytes()))
    }
}

/// Resolve the identifier and leave exactly one copy of it in `headers`.
pub fn apply_to_request(headers: &mut HeaderMap) -> Result<CorrelationId, InvalidHeaderValue> {
    let id = CorrelationId::resolve(headers)?;
    headers.insert(CORRELATION_ID_HEADER.clone(), id.0.clone());
    Ok(id)
}

/// Set the identifier on outgoing response headers, replacing any upstream value.
pub fn apply_to_response(headers: &mut HeaderMap, id: &CorrelationId) {
    headers.insert(CORRELATION_ID_HEADER.clone(), id.0.clone());
}

pub async fn correlation_id(mut req: Request, next: Next) -> Response {
    let id = match apply_to_request(req.headers_mut()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "failed to build correlation id");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    req.extensions_mut().insert(id.clone());

    let span = tracing::info_span!("request", correlation_id = %id);
    let mut response = next.run(req).instrument(span).await;

    apply_to_response(response.headers_mut(), &id);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_canonical_uuid(value: &str) -> bool {
        let groups: Vec<&str> = value.split('-').collect();
        groups.iter().map(|g| g.len()).eq([8, 4, 4, 4, 12])
            && groups
                .iter()
                .all(|g| g.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')))
    }

    #[test]
    fn generates_lowercase_uuid_when_absent() {
        let mut headers = HeaderMap::new();
        let id = apply_to_request(&mut headers).unwrap();
        let value = headers.get(&CORRELATION_ID_HEADER).unwrap().to_str().unwrap();
        assert!(is_canonical_uuid(value), "not a canonical uuid: {value}");
        assert_eq!(id.to_string(), value);
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(
            CorrelationId::generate().unwrap(),
            CorrelationId::generate().unwrap()
        );
    }

    #[test]
    fn reuses_caller_value_verbatim() {
        let mut headers = HeaderMap::new();
        headers.insert("x-correlation-id", "abc-123".parse().unwrap());
        let id = apply_to_request(&mut headers).unwrap();
        assert_eq!(id.to_string(), "abc-123");
        assert_eq!(headers.get("x-correlation-id").unwrap(), "abc-123");
    }

    #[test]
    fn malformed_value_passes_through() {
        let mut headers = HeaderMap::new();
        headers.insert("x-correlation-id", "not a uuid at all!".parse().unwrap());
        let id = apply_to_request(&mut headers).unwrap();
        assert_eq!(id.to_string(), "not a uuid at all!");
    }

    #[test]
    fn first_of_repeated_values_wins_and_duplicates_collapse() {
        let mut headers = HeaderMap::new();
        headers.append("x-correlation-id", "first".parse().unwrap());
        headers.append("x-correlation-id", "second".parse().unwrap());
        let id = apply_to_request(&mut headers).unwrap();

        assert_eq!(id.to_string(), "first");
        let values: Vec<_> = headers.get_all("x-correlation-id").iter().collect();
        assert_eq!(values, ["first"]);
    }

    #[test]
    fn response_value_replaces_upstream_value() {
        let id = CorrelationId::resolve(&{
            let mut h = HeaderMap::new();
            h.insert("x-correlation-id", "caller-id".parse().unwrap());
            h
        })
        .unwrap();
        let mut response_headers = HeaderMap::new();
        response_headers.insert("x-correlation-id", "upstream-id".parse().unwrap());
        apply_to_response(&mut response_headers, &id);

        let values: Vec<_> = response_headers.get_all("x-correlation-id").iter().collect();
        assert_eq!(values, ["caller-id"]);
    }

    #[test]
    fn empty_value_counts_as_present() {
        let mut headers = HeaderMap::new();
        headers.insert("x-correlation-id", HeaderValue::from_static(""));
        let id = apply_to_request(&mut headers).unwrap();
        assert_eq!(id.to_string(), "");
        assert_eq!(headers.get("x-correlation-id").unwrap(), "");
    }
}
