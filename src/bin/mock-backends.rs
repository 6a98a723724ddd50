//! Stand-in backends for interactive use of the dispatcher.
//!
//! Starts six trivial echo services on ephemeral loopback ports and prints
//! their base URLs as a ready-to-use TOML endpoints block. Each service
//! answers every path with `<name>: <path>` and an `X-Backend` header, which
//! is enough to see dispatcher routing working end to end.

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, Response};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICES: [&str; 6] = [
    "compute",
    "networking",
    "load_balancer",
    "block_storage",
    "dns",
    "image",
];

async fn echo(name: &'static str, request: Request<Body>) -> Response<Body> {
    let body = format!("{name}: {}", request.uri().path());
    let mut response = Response::new(Body::from(body));
    response
        .headers_mut()
        .insert("x-backend", HeaderValue::from_static(name));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_backends=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("[endpoints]");
    for name in SERVICES {
        let app = Router::new()
            .route("/", any(move |req| echo(name, req)))
            .route("/{*path}", any(move |req| echo(name, req)));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        println!("{name} = \"http://{addr}\"");

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(backend = name, error = %e, "Mock backend stopped");
            }
        });
    }

    println!();
    println!("Press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await?;
    Ok(())
}
