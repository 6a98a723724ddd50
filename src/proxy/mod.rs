//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     backend base URL
//!     → forwarder.rs (parse scheme + authority, fatal on error)
//!     → one immutable Forwarder per backend, shared hyper client
//!
//! Per request:
//!     inbound Request
//!     → rewrite destination to the backend
//!     → relay backend response verbatim
//! ```
//!
//! # Design Decisions
//! - Destination state parsed once at construction, never per request
//! - Transport failures map to 502; no retry, no caching
//! - Response bodies are streamed, not buffered

pub mod forwarder;

pub use forwarder::{Forwarder, ForwarderError, ForwarderSet};
