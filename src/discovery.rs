use crate::error::Result;
use crate::types::DeviceAddress;
use async_trait::async_trait;
use std::time::Duration;

/// Search parameters for a discovery run
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryQuery {
    /// How long to keep searching before giving up
    pub ttl: Duration,

    /// Poll interval between queries
    pub interval: Duration,

    /// Only accept a device with this friendly name
    pub target_name: Option<String>,

    /// Keep scanning for the full ttl instead of stopping at the first match
    pub full_scan: bool,
}

/// Local-network device discovery
///
/// Resolves a device name (or "any device") to a network address. A resolve
/// call is single-shot: it either yields one address within the query's time
/// window or fails.
#[async_trait]
pub trait Discover: Send + 'static {
    /// Resolve a query to the address of a matching device
    async fn resolve(&mut self, query: &DiscoveryQuery) -> Result<DeviceAddress>;
}
