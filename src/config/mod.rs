//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DispatcherConfig (validated, immutable)
//!     → shared via Arc to the server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path, the tool is
//!   restarted instead
//! - All fields have defaults except the six endpoint URLs, which are the
//!   sole required inputs
//! - Validation separates syntactic (serde) from semantic checks and
//!   reports every error, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{DispatcherConfig, EndpointsConfig, ListenerConfig};
