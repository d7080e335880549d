//! Request ID middleware for request tracing and correlation.
//!
//! An `x-request-id` set by an upstream proxy is reused when it looks sane;
//! otherwise a UUID v4 is generated. The id is recorded on the request span,
//! tagged on the Sentry scope and echoed back in the response headers.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request id accepted verbatim.
const MAX_UPSTREAM_ID_LENGTH: usize = 128;

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(accept_upstream_id)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", request_id.as_str());

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Accept an upstream id only if it is short and free of whitespace and
/// control characters, so it can't forge log lines.
fn accept_upstream_id(raw: &str) -> Option<&str> {
    let id = raw.trim();
    let well_formed = !id.is_empty()
        && id.len() <= MAX_UPSTREAM_ID_LENGTH
        && id.chars().all(|c| c.is_ascii_graphic());
    well_formed.then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_upstream_id() {
        assert_eq!(accept_upstream_id(" cf-ray-8a1b2c "), Some("cf-ray-8a1b2c"));
        assert_eq!(accept_upstream_id(""), None);
        assert_eq!(accept_upstream_id("two words"), None);
        assert_eq!(accept_upstream_id(&"a".repeat(129)), None);
    }
}
