//! Dispatcher binary.
//!
//! Loads configuration (TOML file plus CLI overrides), validates it, and
//! serves the dispatcher until interrupted. The six mock backends are
//! expected to be running already; their base URLs are the only required
//! configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use openstack_mock::config::loader::{parse_file, ConfigError};
use openstack_mock::config::validation::validate_config;
use openstack_mock::config::DispatcherConfig;
use openstack_mock::HttpServer;

#[derive(Parser)]
#[command(name = "openstack-mock")]
#[command(about = "Single-endpoint dispatcher for mock OpenStack services", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address/interface for the dispatcher to bind to
    #[arg(long)]
    listen: Option<String>,

    /// Port for the dispatcher to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Compute (nova) backend base URL
    #[arg(long)]
    compute: Option<String>,

    /// Networking (neutron) backend base URL
    #[arg(long)]
    networking: Option<String>,

    /// Load balancer (octavia) backend base URL
    #[arg(long = "load-balancer")]
    load_balancer: Option<String>,

    /// Block storage (cinder) backend base URL
    #[arg(long = "block-storage")]
    block_storage: Option<String>,

    /// DNS (designate) backend base URL
    #[arg(long)]
    dns: Option<String>,

    /// Image (glance) backend base URL
    #[arg(long)]
    image: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<DispatcherConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => parse_file(path)?,
            None => DispatcherConfig::default(),
        };

        if self.listen.is_some() || self.port.is_some() {
            let current: Option<SocketAddr> = config.listener.bind_address.parse().ok();
            let host = self
                .listen
                .unwrap_or_else(|| match current {
                    Some(addr) => addr.ip().to_string(),
                    None => "127.0.0.1".to_string(),
                });
            let port = self.port.unwrap_or_else(|| match current {
                Some(addr) => addr.port(),
                None => 19090,
            });
            config.listener.bind_address = format!("{host}:{port}");
        }

        let endpoints = &mut config.endpoints;
        if let Some(url) = self.compute {
            endpoints.compute = url;
        }
        if let Some(url) = self.networking {
            endpoints.networking = url;
        }
        if let Some(url) = self.load_balancer {
            endpoints.load_balancer = url;
        }
        if let Some(url) = self.block_storage {
            endpoints.block_storage = url;
        }
        if let Some(url) = self.dns {
            endpoints.dns = url;
        }
        if let Some(url) = self.image {
            endpoints.image = url;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openstack_mock=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Cli::parse().into_config()?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        "Configuration loaded"
    );
    for (service, url) in config.endpoints.iter() {
        tracing::info!(backend = %service, url = %url, "Registered backend");
    }

    // A malformed backend URL is fatal here, before any request is served.
    let server = HttpServer::new(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
