//! Single-endpoint dispatcher for a set of mock OpenStack services.
//!
//! Six independently running mock backends (nova, neutron, octavia, cinder,
//! designate, glance) are unified behind one HTTP address. The dispatcher
//! classifies each inbound request as Keystone token issuance, identity
//! discovery, or a backend path, and either answers it locally or forwards
//! it to the backend whose registered URI prefix matches longest.
//!
//! ```text
//! Client Request
//!     → http::server (dispatch)
//!         → identity::token      (POST /v3/auth/tokens)
//!         → identity::discovery  (/v3/identity, /v3/identity/*)
//!         → routing::router      (longest-prefix lookup)
//!             → proxy::forwarder (rewrite destination, relay)
//!         → 404                  (no route)
//! ```
//!
//! Intended for local development and testing only: tokens are never
//! validated, nothing is persisted, and no TLS is terminated.

pub mod config;
pub mod http;
pub mod identity;
pub mod proxy;
pub mod routing;

pub use config::DispatcherConfig;
pub use http::HttpServer;
