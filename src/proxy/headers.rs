//! Header forwarding and hop-by-hop stripping.
//!
//! [`build_forwarded_headers`] takes the request headers as left by the
//! pipeline stages, strips hop-by-hop headers and rewrites `Host` for the
//! upstream. Everything else (including `Accept`, `Content-Type` and the
//! injected `x-api-key` / `x-correlation-id`) passes through untouched.

use std::sync::LazyLock;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
}

/// Strip hop-by-hop headers from an upstream response.
///
/// When a body is relayed it has been fully buffered, so the origin
/// `content-length` is dropped and axum recomputes it. HEAD, 204 and 304
/// replies have no body and their `content-length` describes the resource,
/// so it is kept as sent.
pub fn strip_response_hop_by_hop(headers: &mut HeaderMap, method: &Method, status: StatusCode) {
    strip_hop_by_hop(headers);
    if relays_body(method, status) {
        headers.remove(hyper::header::CONTENT_LENGTH);
    }
}

fn relays_body(method: &Method, status: StatusCode) -> bool {
    *method != Method::HEAD
        && status != StatusCode::NO_CONTENT
        && status != StatusCode::NOT_MODIFIED
}

pub fn build_forwarded_headers(original: &HeaderMap, target_url: &url::Url) -> HeaderMap {
    let mut headers = original.clone();
    strip_hop_by_hop(&mut headers);

    if let Some(host) = target_url.host_str() {
        let host_value = target_url
            .port()
            .map_or_else(|| host.to_string(), |port| format!("{host}:{port}"));
        if let Ok(val) = HeaderValue::from_str(&host_value) {
            headers.insert(hyper::header::HOST, val);
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_hop_by_hop() {
        let mut original = HeaderMap::new();
        original.insert("connection", "keep-alive".parse().unwrap());
        original.insert("content-type", "application/json".parse().unwrap());

        let target = url::Url::parse("http://target:8080").unwrap();
        let result = build_forwarded_headers(&original, &target);

        assert!(result.get("connection").is_none());
        assert_eq!(result.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn rewrites_host() {
        let mut original = HeaderMap::new();
        original.insert("host", "gateway.local:8080".parse().unwrap());
        let target = url::Url::parse("http://backend:9090/path").unwrap();
        let result = build_forwarded_headers(&original, &target);

        assert_eq!(result.get("host").unwrap(), "backend:9090");
    }

    #[test]
    fn default_port_omitted_from_host() {
        let original = HeaderMap::new();
        let target = url::Url::parse("https://movies.example.com/api").unwrap();
        let result = build_forwarded_headers(&original, &target);

        assert_eq!(result.get("host").unwrap(), "movies.example.com");
    }

    #[test]
    fn keeps_repeated_headers() {
        let mut original = HeaderMap::new();
        original.append("accept", "application/json".parse().unwrap());
        original.append("accept", "text/plain".parse().unwrap());
        let target = url::Url::parse("http://target:8080").unwrap();
        let result = build_forwarded_headers(&original, &target);

        let values: Vec<_> = result.get_all("accept").iter().collect();
        assert_eq!(values, ["application/json", "text/plain"]);
    }

    #[test]
    fn response_content_length_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", "12".parse().unwrap());
        headers.insert("transfer-encoding", "chunked".parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());
        strip_response_hop_by_hop(&mut headers, &Method::GET, StatusCode::OK);

        assert!(headers.get("content-length").is_none());
        assert!(headers.get("transfer-encoding").is_none());
        assert!(headers.get("content-type").is_some());
    }

    #[test]
    fn bodiless_replies_keep_content_length() {
        for (method, status) in [
            (Method::HEAD, StatusCode::OK),
            (Method::GET, StatusCode::NOT_MODIFIED),
            (Method::GET, StatusCode::NO_CONTENT),
        ] {
            let mut headers = HeaderMap::new();
            headers.insert("content-length", "51".parse().unwrap());
            headers.insert("connection", "keep-alive".parse().unwrap());
            strip_response_hop_by_hop(&mut headers, &method, status);

            assert_eq!(headers.get("content-length").unwrap(), "51", "{method} {status}");
            assert!(headers.get("connection").is_none());
        }
    }
}
