//! Keystone emulation subsystem.
//!
//! # Responsibilities
//! - Issue synthetic bearer tokens with a service catalog (token.rs)
//! - Answer identity version discovery (discovery.rs)
//! - Derive the dispatcher's externally observed base URL
//!
//! # Design Decisions
//! - Every document is synthesized fresh per request; nothing is stored,
//!   validated later, or revocable
//! - Catalog and discovery URLs always point back at the dispatcher's own
//!   externally observed address, never at a backend-internal URL, so a
//!   client configured from the catalog keeps talking through the
//!   dispatcher

pub mod discovery;
pub mod token;

use axum::body::Body;
use axum::http::{header, Request};

/// Path that issues tokens (exact match, POST only).
pub const TOKEN_PATH: &str = "/v3/auth/tokens";

/// Identity discovery path (exact or nested match).
pub const IDENTITY_PATH: &str = "/v3/identity";

/// The dispatcher's base URL as the caller observed it.
///
/// Scheme precedence: `X-Forwarded-Proto` header, then the scheme recorded
/// on the request URI, else plain `http`. The dispatcher never terminates
/// TLS itself, so an https scheme can only arrive via the header or URI.
/// Host is the inbound `Host` header, falling back to the URI authority.
pub fn observed_base(request: &Request<Body>) -> String {
    let scheme = request
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .or_else(|| request.uri().scheme_str())
        .unwrap_or("http");

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .unwrap_or("localhost");

    format!("{scheme}://{host}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)], uri: &str) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_forwarded_proto_takes_precedence() {
        let req = request(
            &[("host", "mock.local:19090"), ("x-forwarded-proto", "https")],
            "http://ignored/v3/auth/tokens",
        );
        assert_eq!(observed_base(&req), "https://mock.local:19090");
    }

    #[test]
    fn test_uri_scheme_used_when_no_forwarded_proto() {
        let req = request(&[("host", "mock.local")], "https://mock.local/v3/identity");
        assert_eq!(observed_base(&req), "https://mock.local");
    }

    #[test]
    fn test_falls_back_to_plain_http() {
        let req = request(&[("host", "127.0.0.1:19090")], "/v3/identity");
        assert_eq!(observed_base(&req), "http://127.0.0.1:19090");
    }

    #[test]
    fn test_host_falls_back_to_uri_authority() {
        let req = request(&[], "http://10.0.0.1:19090/v3/identity");
        assert_eq!(observed_base(&req), "http://10.0.0.1:19090");
    }
}
