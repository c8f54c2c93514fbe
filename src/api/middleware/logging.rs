//! Request/response logging middleware with sensitive data redaction

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tower_http::request_id::RequestId;
use tracing::info;

/// Query parameters that carry plaintext passwords or one-time tokens
static SENSITIVE_QUERY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(^|&)(p|password|token|code)=[^&]*").unwrap());

/// Middleware to log HTTP requests and responses.
/// `TraceLayer` owns the request span; this middleware only emits events.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = extract_path(&request);
    let query = request.uri().query().map(redact_query).unwrap_or_default();
    let request_id = extract_request_id(&request);
    let headers_log = redact_headers(&request);

    info!(
        method = %method,
        path = %path,
        query = %query,
        request_id = %request_id,
        headers = %headers_log,
        "Incoming request"
    );

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        request_id = %request_id,
        "Request completed"
    );

    response
}

fn extract_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// Id stamped by `SetRequestIdLayer`, or `-` when the layer is absent
fn extract_request_id(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-")
        .to_string()
}

/// Replace the values of sensitive query parameters
pub fn redact_query(query: &str) -> String {
    SENSITIVE_QUERY
        .replace_all(query, "${1}${2}=[REDACTED]")
        .into_owned()
}

fn redact_headers(request: &Request<Body>) -> String {
    request
        .headers()
        .iter()
        .filter(|(name, _)| should_log_header(name.as_str()))
        .map(|(name, value)| {
            let value = if is_sensitive_header(name.as_str()) {
                "[REDACTED]"
            } else {
                value.to_str().unwrap_or("[invalid]")
            };
            format!("{}={}", name.as_str(), value)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_sensitive_header(name: &str) -> bool {
    matches!(
        name,
        "authorization" | "cookie" | "set-cookie" | "proxy-authorization"
    )
}

fn should_log_header(name: &str) -> bool {
    matches!(
        name,
        "content-type"
            | "content-length"
            | "accept"
            | "user-agent"
            | "x-request-id"
            | "x-forwarded-for"
            | "x-real-ip"
            | "authorization"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_sensitive_header() {
        assert!(is_sensitive_header("authorization"));
        assert!(is_sensitive_header("cookie"));
        assert!(!is_sensitive_header("content-type"));
    }

    #[test]
    fn test_should_log_header() {
        assert!(should_log_header("content-type"));
        assert!(should_log_header("authorization"));
        assert!(!should_log_header("cache-control"));
    }

    #[test]
    fn test_redact_query() {
        assert_eq!(redact_query("p=hunter2"), "p=[REDACTED]");
        assert_eq!(
            redact_query("username=sam&token=abc-123"),
            "username=sam&token=[REDACTED]"
        );
        assert_eq!(redact_query("slack=%40sam"), "slack=%40sam");
    }

    #[test]
    fn test_request_id_comes_from_extension() {
        let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(extract_request_id(&request), "-");

        request
            .extensions_mut()
            .insert(RequestId::new("req-42".parse().unwrap()));
        assert_eq!(extract_request_id(&request), "req-42");
    }

    #[test]
    fn test_redact_query_does_not_touch_similar_names() {
        assert_eq!(redact_query("pp=1&top=2"), "pp=1&top=2");
    }
}
