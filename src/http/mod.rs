//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request
//!     → server.rs (axum catch-all handler)
//!     → token path?      identity::token
//!     → identity path?   identity::discovery
//!     → prefix match?    proxy::forwarder
//!     → otherwise        404 diagnostic
//! ```
//!
//! # Design Decisions
//! - A single catch-all route; dispatch order is fixed and explicit
//! - Shared state is built once and held in Arc, no locks
//! - Request IDs and trace spans come from tower-http layers

pub mod server;

pub use server::HttpServer;
