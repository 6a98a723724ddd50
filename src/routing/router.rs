//! Route lookup.
//!
//! # Responsibilities
//! - Scan the ordered route table for the first matching prefix
//! - Return the matched backend or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) linear scan; the table is small and sorted longest-first, so the
//!   first hit is always the most specific one
//! - Matching is plain `starts_with` from position 0, not segment-aware,
//!   matching how the backend muxes register their prefixes

use crate::routing::table::{RouteTable, ServiceKind};

/// Longest-prefix router over an immutable [`RouteTable`].
#[derive(Debug, Clone)]
pub struct PrefixRouter {
    table: RouteTable,
}

impl PrefixRouter {
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    /// Select the backend for `path`, or `None` if no registered prefix
    /// matches. The table is sorted longest-first with a lexicographic
    /// tie-break, so the result is deterministic for overlapping prefixes.
    pub fn route(&self, path: &str) -> Option<ServiceKind> {
        self.table
            .entries()
            .iter()
            .find(|entry| path.starts_with(&entry.prefix))
            .map(|entry| entry.service)
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }
}
