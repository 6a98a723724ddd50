//! Transparent per-backend request forwarding.
//!
//! # Responsibilities
//! - Parse each backend base URL into a reusable destination (scheme + host)
//! - Rewrite inbound requests to the backend and relay the response
//! - Record the original `Host` in `X-Forwarded-Host`
//!
//! # Design Decisions
//! - A malformed base URL is a construction error, surfaced before the
//!   server starts serving; request time never sees an unparsed URL
//! - The base URL's path component is ignored: the mock backends register
//!   the same prefixes the dispatcher routes on (e.g. `/servers`), so the
//!   inbound path is relayed as-is with no joining
//! - Backend errors surface as 502 with a short text body

use axum::body::Body;
use axum::http::uri::{Authority, Scheme};
use axum::http::{header, HeaderValue, Request, Response, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use url::Url;

use crate::routing::ServiceKind;

/// Errors building a [`Forwarder`] from a backend base URL. All of these
/// are fatal configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error("invalid backend URL {url:?} for {service}: {source}")]
    InvalidUrl {
        service: ServiceKind,
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("backend URL {url:?} for {service} has no host")]
    MissingHost { service: ServiceKind, url: String },
    #[error("backend URL {url:?} for {service} has unsupported scheme {scheme:?}")]
    UnsupportedScheme {
        service: ServiceKind,
        url: String,
        scheme: String,
    },
}

/// Relays requests to a single backend. Constructed once per backend and
/// shared read-only across all requests.
#[derive(Debug, Clone)]
pub struct Forwarder {
    service: ServiceKind,
    scheme: Scheme,
    authority: Authority,
    client: Client<HttpConnector, Body>,
}

impl Forwarder {
    pub fn new(
        service: ServiceKind,
        base_url: &str,
        client: Client<HttpConnector, Body>,
    ) -> Result<Self, ForwarderError> {
        let parsed = Url::parse(base_url).map_err(|source| ForwarderError::InvalidUrl {
            service,
            url: base_url.to_string(),
            source,
        })?;

        let scheme = match parsed.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => {
                return Err(ForwarderError::UnsupportedScheme {
                    service,
                    url: base_url.to_string(),
                    scheme: other.to_string(),
                })
            }
        };

        let host = parsed.host_str().ok_or_else(|| ForwarderError::MissingHost {
            service,
            url: base_url.to_string(),
        })?;
        let authority_str = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority =
            authority_str
                .parse::<Authority>()
                .map_err(|_| ForwarderError::MissingHost {
                    service,
                    url: base_url.to_string(),
                })?;

        Ok(Self {
            service,
            scheme,
            authority,
            client,
        })
    }

    pub fn service(&self) -> ServiceKind {
        self.service
    }

    /// Rewrite `request` to target this backend and relay the response.
    ///
    /// Method, path, query, headers, and body pass through unchanged except
    /// for the destination rewrite: URI scheme/authority become the
    /// backend's, `Host` is set to the backend authority, and the original
    /// inbound `Host` is preserved in `X-Forwarded-Host` unless the caller
    /// already supplied one.
    pub async fn forward(&self, mut request: Request<Body>) -> Response<Body> {
        let inbound_host = request
            .headers()
            .get(header::HOST)
            .cloned()
            .or_else(|| host_from_uri(request.uri()));

        let mut parts = request.uri().clone().into_parts();
        parts.scheme = Some(self.scheme.clone());
        parts.authority = Some(self.authority.clone());
        let uri = match Uri::from_parts(parts) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::error!(backend = %self.service, error = %e, "Failed to rewrite request URI");
                return gateway_error();
            }
        };
        *request.uri_mut() = uri;

        let headers = request.headers_mut();
        if !headers.contains_key("x-forwarded-host") {
            if let Some(host) = inbound_host {
                headers.insert("x-forwarded-host", host);
            }
        }
        if let Ok(host) = HeaderValue::from_str(self.authority.as_str()) {
            headers.insert(header::HOST, host);
        }

        match self.client.request(request).await {
            Ok(response) => {
                let (parts, body) = response.into_parts();
                Response::from_parts(parts, Body::new(body))
            }
            Err(e) => {
                tracing::error!(backend = %self.service, error = %e, "Backend request failed");
                gateway_error()
            }
        }
    }
}

fn host_from_uri(uri: &Uri) -> Option<HeaderValue> {
    uri.authority()
        .and_then(|a| HeaderValue::from_str(a.as_str()).ok())
}

fn gateway_error() -> Response<Body> {
    let mut response = Response::new(Body::from("upstream request failed"));
    *response.status_mut() = StatusCode::BAD_GATEWAY;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// All six forwarders, indexed by [`ServiceKind`]. Built once at startup
/// from the configured endpoints.
#[derive(Debug, Clone)]
pub struct ForwarderSet {
    forwarders: Vec<Forwarder>,
}

impl ForwarderSet {
    /// Build a forwarder for every backend. `endpoints` yields one
    /// `(service, base_url)` pair per backend; any unparseable URL aborts
    /// construction.
    pub fn new<'a, I>(endpoints: I) -> Result<Self, ForwarderError>
    where
        I: IntoIterator<Item = (ServiceKind, &'a str)>,
    {
        let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(HttpConnector::new());
        let mut forwarders = Vec::new();
        for (service, base_url) in endpoints {
            forwarders.push(Forwarder::new(service, base_url, client.clone())?);
        }
        Ok(Self { forwarders })
    }

    pub fn get(&self, service: ServiceKind) -> Option<&Forwarder> {
        self.forwarders.iter().find(|f| f.service == service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client<HttpConnector, Body> {
        Client::builder(hyper_util::rt::TokioExecutor::new()).build(HttpConnector::new())
    }

    #[test]
    fn test_valid_base_url() {
        let f = Forwarder::new(ServiceKind::Compute, "http://127.0.0.1:8774", client()).unwrap();
        assert_eq!(f.service(), ServiceKind::Compute);
        assert_eq!(f.authority.as_str(), "127.0.0.1:8774");
        assert_eq!(f.scheme, Scheme::HTTP);
    }

    #[test]
    fn test_trailing_slash_base_url_is_accepted() {
        // httptest-style endpoints end with '/'; the path part is ignored.
        let f = Forwarder::new(ServiceKind::Image, "http://127.0.0.1:9292/", client()).unwrap();
        assert_eq!(f.authority.as_str(), "127.0.0.1:9292");
    }

    #[test]
    fn test_malformed_url_is_rejected() {
        let err = Forwarder::new(ServiceKind::Dns, "not a url", client()).unwrap_err();
        assert!(matches!(err, ForwarderError::InvalidUrl { .. }));
    }

    #[test]
    fn test_non_http_scheme_is_rejected() {
        let err = Forwarder::new(ServiceKind::Dns, "ftp://127.0.0.1:21", client()).unwrap_err();
        assert!(matches!(err, ForwarderError::UnsupportedScheme { .. }));
    }

    #[test]
    fn test_forwarder_set_indexes_by_service() {
        let set = ForwarderSet::new(vec![
            (ServiceKind::Compute, "http://127.0.0.1:1001"),
            (ServiceKind::Image, "http://127.0.0.1:1002"),
        ])
        .unwrap();
        assert!(set.get(ServiceKind::Compute).is_some());
        assert!(set.get(ServiceKind::Image).is_some());
        assert!(set.get(ServiceKind::Dns).is_none());
    }

    #[test]
    fn test_forwarder_set_fails_on_any_bad_url() {
        let err = ForwarderSet::new(vec![
            (ServiceKind::Compute, "http://127.0.0.1:1001"),
            (ServiceKind::Image, "::bad::"),
        ])
        .unwrap_err();
        assert!(matches!(err, ForwarderError::InvalidUrl { .. }));
    }
}
