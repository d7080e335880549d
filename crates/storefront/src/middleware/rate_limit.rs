//! Rate limiting middleware using governor and `tower_governor`.
//!
//! - `auth_rate_limiter`: signup and login (~10/min per IP)
//! - `public_write_rate_limiter`: anonymous writes such as placing orders
//!   and counting product views (~60/min per IP)

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Client IP headers, in order of trust. Cloudflare's comes first because it
/// can't be spoofed past the edge; `x-forwarded-for` is read up to its first hop.
const CLIENT_IP_HEADERS: [&str; 4] = [
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

/// Key extractor that reads the real client IP from proxy headers.
#[derive(Clone, Copy)]
pub struct CloudflareIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for CloudflareIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        client_ip(req.headers()).ok_or(GovernorError::UnableToExtractKey)
    }
}

fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<CloudflareIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn limiter(replenish_secs: u64, burst: u32) -> Option<RateLimiterLayer> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(CloudflareIpKeyExtractor)
        .per_second(replenish_secs)
        .burst_size(burst)
        .finish()?;
    Some(GovernorLayer::new(Arc::new(config)))
}

/// Rate limiter for signup and login: 1 token every 6 seconds, burst of 5.
///
/// # Panics
///
/// Never in practice: the builder only rejects a zero period or burst.
#[must_use]
#[allow(clippy::expect_used)]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    limiter(6, 5).expect("auth rate limiter uses a non-zero period and burst")
}

/// Rate limiter for anonymous writes: 1 token per second, burst of 30.
///
/// # Panics
///
/// Never in practice: the builder only rejects a zero period or burst.
#[must_use]
#[allow(clippy::expect_used)]
pub fn public_write_rate_limiter() -> RateLimiterLayer {
    limiter(1, 30).expect("public write rate limiter uses a non-zero period and burst")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_cloudflare() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        assert_eq!(client_ip(&headers), "10.0.0.1".parse().ok());

        headers.insert("cf-connecting-ip", HeaderValue::from_static("41.58.1.7"));
        assert_eq!(client_ip(&headers), "41.58.1.7".parse().ok());
    }

    #[test]
    fn test_client_ip_missing() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("not-an-ip"));
        assert_eq!(client_ip(&headers), None);
    }
}
