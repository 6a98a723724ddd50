//! Route table construction.
//!
//! # Responsibilities
//! - Name the six backend services and their catalog identities
//! - Hold the declarative prefix catalog as data, not logic
//! - Produce an ordered, immutable table for the prefix router
//!
//! # Design Decisions
//! - Ordering is fixed at construction: descending prefix length, then
//!   ascending lexicographic for equal lengths. The longer of two
//!   overlapping prefixes always wins regardless of registration order.
//! - No conflict detection: the default catalog has no equal-length
//!   collisions, and the tie-break keeps lookup deterministic if a custom
//!   catalog introduces one.

use std::cmp::Ordering;

/// The six mock backend services the dispatcher can forward to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Compute,
    Networking,
    LoadBalancer,
    BlockStorage,
    Dns,
    Image,
}

impl ServiceKind {
    /// All backends, in service-catalog order.
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::Compute,
        ServiceKind::Networking,
        ServiceKind::LoadBalancer,
        ServiceKind::BlockStorage,
        ServiceKind::Dns,
        ServiceKind::Image,
    ];

    /// Service `type` as it appears in a Keystone catalog entry.
    pub fn catalog_type(self) -> &'static str {
        match self {
            ServiceKind::Compute => "compute",
            ServiceKind::Networking => "network",
            ServiceKind::LoadBalancer => "load-balancer",
            ServiceKind::BlockStorage => "block-storage",
            ServiceKind::Dns => "dns",
            ServiceKind::Image => "image",
        }
    }

    /// Canonical OpenStack service name for the catalog entry.
    pub fn catalog_name(self) -> &'static str {
        match self {
            ServiceKind::Compute => "nova",
            ServiceKind::Networking => "neutron",
            ServiceKind::LoadBalancer => "octavia",
            ServiceKind::BlockStorage => "cinder",
            ServiceKind::Dns => "designate",
            ServiceKind::Image => "glance",
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.catalog_type())
    }
}

/// One prefix rule: requests whose path starts with `prefix` belong to
/// `service`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub prefix: String,
    pub service: ServiceKind,
}

/// Ordered, immutable prefix table. Built once at startup and shared
/// read-only across all requests.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build a table from declarative pairs. Input order is irrelevant;
    /// the table sorts itself into its canonical match order.
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = (S, ServiceKind)>,
        S: Into<String>,
    {
        let mut entries: Vec<RouteEntry> = routes
            .into_iter()
            .map(|(prefix, service)| RouteEntry {
                prefix: prefix.into(),
                service,
            })
            .collect();
        entries.sort_by(|a, b| match b.prefix.len().cmp(&a.prefix.len()) {
            Ordering::Equal => a.prefix.cmp(&b.prefix),
            other => other,
        });
        Self { entries }
    }

    /// Entries in match order (longest first).
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The default prefix catalog covering the REST surface of the six mock
/// services. Both trailing-slash and bare variants are registered so that
/// `/servers` and `/servers/123` hit the same backend; the image service
/// additionally registers its versioned `/v2/images` form.
pub fn default_routes() -> Vec<(&'static str, ServiceKind)> {
    vec![
        // Compute (Nova)
        ("/servers/", ServiceKind::Compute),
        ("/servers", ServiceKind::Compute),
        ("/os-keypairs/", ServiceKind::Compute),
        ("/os-keypairs", ServiceKind::Compute),
        ("/flavors/", ServiceKind::Compute),
        ("/flavors", ServiceKind::Compute),
        ("/os-instance-actions/", ServiceKind::Compute),
        // Image (Glance)
        ("/images/", ServiceKind::Image),
        ("/images", ServiceKind::Image),
        ("/v2/images/", ServiceKind::Image),
        ("/v2/images", ServiceKind::Image),
        // BlockStorage (Cinder)
        ("/volumes/", ServiceKind::BlockStorage),
        ("/volumes", ServiceKind::BlockStorage),
        ("/types/", ServiceKind::BlockStorage),
        ("/types", ServiceKind::BlockStorage),
        ("/os-availability-zone", ServiceKind::BlockStorage),
        // DNS (Designate)
        ("/zones/", ServiceKind::Dns),
        ("/zones", ServiceKind::Dns),
        // Networking (Neutron)
        ("/networks/", ServiceKind::Networking),
        ("/networks", ServiceKind::Networking),
        ("/ports/", ServiceKind::Networking),
        ("/ports", ServiceKind::Networking),
        ("/routers/", ServiceKind::Networking),
        ("/routers", ServiceKind::Networking),
        ("/security-groups/", ServiceKind::Networking),
        ("/security-groups", ServiceKind::Networking),
        ("/security-group-rules/", ServiceKind::Networking),
        ("/security-group-rules", ServiceKind::Networking),
        ("/subnets/", ServiceKind::Networking),
        ("/subnets", ServiceKind::Networking),
        ("/floatingips/", ServiceKind::Networking),
        ("/floatingips", ServiceKind::Networking),
        // LoadBalancer (Octavia)
        ("/lbaas/listeners/", ServiceKind::LoadBalancer),
        ("/lbaas/listeners", ServiceKind::LoadBalancer),
        ("/lbaas/loadbalancers/", ServiceKind::LoadBalancer),
        ("/lbaas/loadbalancers", ServiceKind::LoadBalancer),
        ("/lbaas/pools/", ServiceKind::LoadBalancer),
        ("/lbaas/pools", ServiceKind::LoadBalancer),
    ]
}
