//! Identity version discovery.
//!
//! # Responsibilities
//! - Answer `GET /v3/identity` (and anything nested under it) with a
//!   plausible version-discovery document
//! - Answer `HEAD` with status only
//!
//! # Design Decisions
//! - HEAD short-circuits before the document is built
//! - The self link uses the caller's observed base, matching the catalog

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, Response, StatusCode};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::identity::token::empty_status;
use crate::identity::{observed_base, IDENTITY_PATH};

#[derive(Debug, Serialize)]
struct DiscoveryResponse {
    identity: DiscoveryDocument,
}

#[derive(Debug, Serialize)]
struct DiscoveryDocument {
    version: &'static str,
    status: &'static str,
    updated: String,
    links: Vec<Link>,
}

#[derive(Debug, Serialize)]
struct Link {
    rel: &'static str,
    href: String,
}

/// Handle a request under the identity discovery path. GET returns the
/// document, HEAD returns 200 with no body, anything else an empty 405.
pub fn handle(request: &Request<Body>) -> Response<Body> {
    match *request.method() {
        Method::HEAD => {
            let mut response = empty_status(StatusCode::OK);
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            response
        }
        Method::GET => {
            let base = observed_base(request);
            let document = DiscoveryResponse {
                identity: DiscoveryDocument {
                    version: "v3",
                    status: "ok",
                    updated: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                    links: vec![Link {
                        rel: "self",
                        href: format!("{base}{IDENTITY_PATH}"),
                    }],
                },
            };
            let body = match serde_json::to_vec(&document) {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize discovery document");
                    return empty_status(StatusCode::INTERNAL_SERVER_ERROR);
                }
            };
            let mut response = Response::new(Body::from(body));
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            response
        }
        _ => empty_status(StatusCode::METHOD_NOT_ALLOWED),
    }
}
