//! Synthetic Keystone v3 token issuance.
//!
//! # Responsibilities
//! - Answer `POST /v3/auth/tokens` with a fresh opaque token
//! - Emit the `X-Subject-Token` header the way Keystone does
//! - Build a service catalog pointing every service at the dispatcher
//!
//! # Design Decisions
//! - No credential is ever checked: every well-formed POST succeeds with a
//!   distinct token, and no token is stored or validated afterwards
//! - Catalog endpoint URLs use the caller's observed scheme and host, so
//!   clients bootstrapped from the catalog route all traffic back through
//!   the dispatcher rather than reaching for backend-internal addresses

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, Response, StatusCode};
use chrono::{Duration, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::identity::{observed_base, IDENTITY_PATH};
use crate::routing::ServiceKind;

/// Header carrying the issued token, as Keystone emits it.
pub const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

const REGION: &str = "RegionOne";

#[derive(Debug, Serialize)]
struct TokenResponse {
    token: TokenDocument,
}

#[derive(Debug, Serialize)]
struct TokenDocument {
    expires_at: String,
    project: Identity,
    user: Identity,
    catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Serialize)]
struct Identity {
    id: &'static str,
    name: &'static str,
}

#[derive(Debug, Serialize)]
struct CatalogEntry {
    id: Uuid,
    #[serde(rename = "type")]
    service_type: &'static str,
    name: &'static str,
    endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Serialize)]
struct CatalogEndpoint {
    id: Uuid,
    interface: &'static str,
    region: &'static str,
    region_id: &'static str,
    url: String,
}

fn endpoint(url: String) -> CatalogEndpoint {
    CatalogEndpoint {
        id: Uuid::new_v4(),
        interface: "public",
        region: REGION,
        region_id: REGION,
        url,
    }
}

/// One entry per backend plus the identity service itself, every URL rooted
/// at `base` (the dispatcher's externally observed address).
fn build_catalog(base: &str) -> Vec<CatalogEntry> {
    let mut catalog: Vec<CatalogEntry> = ServiceKind::ALL
        .into_iter()
        .map(|service| CatalogEntry {
            id: Uuid::new_v4(),
            service_type: service.catalog_type(),
            name: service.catalog_name(),
            endpoints: vec![endpoint(base.to_string())],
        })
        .collect();
    catalog.push(CatalogEntry {
        id: Uuid::new_v4(),
        service_type: "identity",
        name: "keystone",
        endpoints: vec![endpoint(format!("{base}{IDENTITY_PATH}"))],
    });
    catalog
}

/// Handle a request to the token-issuance path. Non-POST methods get an
/// empty 405.
pub fn handle(request: &Request<Body>) -> Response<Body> {
    if request.method() != Method::POST {
        return empty_status(StatusCode::METHOD_NOT_ALLOWED);
    }

    let base = observed_base(request);
    let token = Uuid::new_v4().to_string();

    let document = TokenResponse {
        token: TokenDocument {
            expires_at: (Utc::now() + Duration::hours(1))
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            project: Identity {
                id: "mock-project-id",
                name: "mock",
            },
            user: Identity {
                id: "mock-user-id",
                name: "mock-user",
            },
            catalog: build_catalog(&base),
        },
    };

    let body = match serde_json::to_vec(&document) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize token document");
            return empty_status(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    tracing::debug!(base = %base, "Issued mock token");

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::CREATED;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if let Ok(value) = HeaderValue::from_str(&token) {
        response.headers_mut().insert(SUBJECT_TOKEN_HEADER, value);
    }
    response
}

pub(crate) fn empty_status(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/v3/auth/tokens")
            .header("host", "127.0.0.1:19090")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_non_post_is_405_with_empty_body() {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::HEAD] {
            let req = Request::builder()
                .method(method.clone())
                .uri("/v3/auth/tokens")
                .body(Body::empty())
                .unwrap();
            let resp = handle(&req);
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert!(resp.headers().get(SUBJECT_TOKEN_HEADER).is_none());
        }
    }

    #[test]
    fn test_post_issues_distinct_tokens() {
        let first = handle(&post());
        let second = handle(&post());
        assert_eq!(first.status(), StatusCode::CREATED);
        assert_eq!(second.status(), StatusCode::CREATED);
        let t1 = first.headers().get(SUBJECT_TOKEN_HEADER).unwrap();
        let t2 = second.headers().get(SUBJECT_TOKEN_HEADER).unwrap();
        assert!(!t1.is_empty());
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_catalog_has_one_entry_per_backend_plus_identity() {
        let catalog = build_catalog("http://127.0.0.1:19090");
        assert_eq!(catalog.len(), ServiceKind::ALL.len() + 1);
        for service in ServiceKind::ALL {
            assert!(
                catalog
                    .iter()
                    .any(|e| e.service_type == service.catalog_type()),
                "missing catalog entry for {service}"
            );
        }
        let identity = catalog.last().unwrap();
        assert_eq!(identity.service_type, "identity");
        assert_eq!(identity.name, "keystone");
        assert_eq!(
            identity.endpoints[0].url,
            "http://127.0.0.1:19090/v3/identity"
        );
    }

    #[test]
    fn test_catalog_urls_point_at_dispatcher() {
        let catalog = build_catalog("https://mock.local:19090");
        for entry in &catalog {
            for ep in &entry.endpoints {
                assert!(
                    ep.url.starts_with("https://mock.local:19090"),
                    "{} endpoint leaks a foreign URL: {}",
                    entry.name,
                    ep.url
                );
                assert_eq!(ep.interface, "public");
                assert_eq!(ep.region, REGION);
            }
        }
    }
}
