//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, Response};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;

use openstack_mock::config::{DispatcherConfig, EndpointsConfig};
use openstack_mock::HttpServer;

/// Start a mock backend that answers every path with `<name>: <path>` and
/// echoes routing-relevant request details back in response headers.
/// Returns the backend's base URL.
pub async fn start_mock_backend(name: &'static str) -> String {
    async fn respond(name: &'static str, request: Request<Body>) -> Response<Body> {
        let method = request.method().to_string();
        let path = request.uri().path().to_string();
        let query = request.uri().query().map(str::to_string);
        let forwarded_host = request
            .headers()
            .get("x-forwarded-host")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut response = Response::new(Body::from(format!("{name}: {path}")));
        let headers = response.headers_mut();
        headers.insert("x-backend", HeaderValue::from_static(name));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        if let Ok(value) = HeaderValue::from_str(&method) {
            headers.insert("x-echo-method", value);
        }
        if let Some(query) = query {
            if let Ok(value) = HeaderValue::from_str(&query) {
                headers.insert("x-echo-query", value);
            }
        }
        if let Some(host) = forwarded_host {
            if let Ok(value) = HeaderValue::from_str(&host) {
                headers.insert("x-echo-forwarded-host", value);
            }
        }
        response
    }

    let app = Router::new()
        .route("/", any(move |req| respond(name, req)))
        .route("/{*path}", any(move |req| respond(name, req)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{addr}")
}

/// Start all six mock backends and return a config pointing at them.
pub async fn mock_cloud_config() -> DispatcherConfig {
    DispatcherConfig {
        endpoints: EndpointsConfig {
            compute: start_mock_backend("compute").await,
            networking: start_mock_backend("networking").await,
            load_balancer: start_mock_backend("loadbalancer").await,
            block_storage: start_mock_backend("blockstorage").await,
            dns: start_mock_backend("dns").await,
            image: start_mock_backend("image").await,
        },
        ..Default::default()
    }
}

/// Run a dispatcher for `config` on an ephemeral port and return its
/// address.
pub async fn start_dispatcher(config: &DispatcherConfig) -> SocketAddr {
    let server = HttpServer::new(config).expect("dispatcher construction failed");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    addr
}

/// HTTP client without connection pooling, so each test request hits a
/// fresh connection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
