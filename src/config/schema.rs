//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML config
//! files. The endpoints block is the sole configuration input the dispatch
//! core consumes; the listener block is operational plumbing for the
//! binary.

use serde::{Deserialize, Serialize};

use crate::routing::ServiceKind;

/// Root configuration for the dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Base URLs of the six running mock backends.
    pub endpoints: EndpointsConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:19090").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:19090".to_string(),
        }
    }
}

/// Base URLs for each mock backend. Immutable once supplied.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Compute (nova) base URL.
    pub compute: String,

    /// Networking (neutron) base URL.
    pub networking: String,

    /// Load balancer (octavia) base URL.
    pub load_balancer: String,

    /// Block storage (cinder) base URL.
    pub block_storage: String,

    /// DNS (designate) base URL.
    pub dns: String,

    /// Image (glance) base URL.
    pub image: String,
}

impl EndpointsConfig {
    /// Base URL for one service.
    pub fn url(&self, service: ServiceKind) -> &str {
        match service {
            ServiceKind::Compute => &self.compute,
            ServiceKind::Networking => &self.networking,
            ServiceKind::LoadBalancer => &self.load_balancer,
            ServiceKind::BlockStorage => &self.block_storage,
            ServiceKind::Dns => &self.dns,
            ServiceKind::Image => &self.image,
        }
    }

    /// All `(service, base_url)` pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (ServiceKind, &str)> {
        ServiceKind::ALL
            .into_iter()
            .map(|service| (service, self.url(service)))
    }
}
