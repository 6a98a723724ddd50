//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     (prefix, ServiceKind)[]
//!     → Sort by descending prefix length, then lexicographic
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (path)
//!     → router.rs (ordered prefix scan)
//!     → Return: matched ServiceKind or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Literal byte-prefix matching only (no regex, not segment-aware)
//! - Deterministic: ordering is explicit, never map iteration order
//! - Longest prefix wins; equal lengths break ties lexicographically

pub mod router;
pub mod table;

pub use router::PrefixRouter;
pub use table::{default_routes, RouteEntry, RouteTable, ServiceKind};
