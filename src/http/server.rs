//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Build the forwarder set and prefix router from configuration
//! - Create the Axum router with the catch-all dispatch handler
//! - Wire up middleware (tracing, request ID)
//! - Serve on a caller-supplied listener
//!
//! # Design Decisions
//! - Dispatch priority is fixed: token path, identity path, prefix route,
//!   then a diagnostic 404 naming the unmatched path
//! - No dispatcher-imposed timeout: a slow backend stalls its caller,
//!   which is acceptable for a disposable local fixture
//! - Forwarding errors never propagate as panics; they surface as 502

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, Response, StatusCode},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::DispatcherConfig;
use crate::identity::{discovery, token, IDENTITY_PATH, TOKEN_PATH};
use crate::proxy::{ForwarderError, ForwarderSet};
use crate::routing::{default_routes, PrefixRouter, RouteTable};

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<PrefixRouter>,
    pub forwarders: Arc<ForwarderSet>,
}

/// HTTP server hosting the dispatcher.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server for the given configuration with the default prefix
    /// catalog. Fails if any backend base URL cannot be parsed.
    pub fn new(config: &DispatcherConfig) -> Result<Self, ForwarderError> {
        Self::with_routes(config, default_routes())
    }

    /// Create a server with a custom prefix catalog. The catalog is data:
    /// callers can add or drop prefixes without touching the router.
    pub fn with_routes(
        config: &DispatcherConfig,
        routes: Vec<(&'static str, crate::routing::ServiceKind)>,
    ) -> Result<Self, ForwarderError> {
        let forwarders = Arc::new(ForwarderSet::new(config.endpoints.iter())?);
        let router = Arc::new(PrefixRouter::new(RouteTable::new(routes)));

        let state = AppState { router, forwarders };

        let router = Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        Ok(Self { router })
    }

    /// Run the server, accepting connections on the given listener until
    /// the process is interrupted.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Dispatcher listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Dispatcher stopped");
        Ok(())
    }
}

/// Catch-all handler: classify the request and route it.
///
/// Priority order per request:
/// 1. Exact token-issuance path
/// 2. Exact or nested identity path
/// 3. Longest registered prefix, forwarded to its backend
/// 4. Diagnostic 404 naming the path
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response<Body> {
    let path = request.uri().path().to_string();

    if path == TOKEN_PATH {
        return token::handle(&request);
    }

    if is_identity_path(&path) {
        return discovery::handle(&request);
    }

    if let Some(service) = state.router.route(&path) {
        tracing::debug!(path = %path, backend = %service, "Forwarding request");
        if let Some(forwarder) = state.forwarders.get(service) {
            return forwarder.forward(request).await;
        }
        // The default catalog only names services the set was built from,
        // so a miss here means a custom catalog references an endpoint
        // that was never configured.
        tracing::error!(path = %path, backend = %service, "No forwarder for matched backend");
        return plain_text(
            StatusCode::BAD_GATEWAY,
            format!("no backend configured for {service}\n"),
        );
    }

    tracing::debug!(path = %path, "No route matched");
    plain_text(StatusCode::NOT_FOUND, format!("no route for path: {path}\n"))
}

/// Exact identity path or anything nested under it. A sibling like
/// `/v3/identityfoo` does not match.
fn is_identity_path(path: &str) -> bool {
    match path.strip_prefix(IDENTITY_PATH) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn plain_text(status: StatusCode, body: String) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Wait for shutdown signal (Ctrl+C). In-flight requests are not drained;
/// the tool is ephemeral test infrastructure.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
