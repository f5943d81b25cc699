// # IP Cache Trait
//
// Defines the interface for remembering the public IP seen by the previous
// run.
//
// ## Purpose
//
// The cache is a hint only. Every run still verifies each record against the
// remote service; the cached value decides how the run describes the IP
// ("changed from X" vs "unchanged").
//
// ## Implementations
//
// - File-based: bare string in a one-line file (`FileIpCache`)
// - In-memory: `MemoryIpCache`, for tests

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP cache implementations
#[async_trait]
pub trait IpCache: Send + Sync {
    /// Read the last observed IP
    ///
    /// # Returns
    ///
    /// - `Ok(None)`: No prior observation
    /// - `Ok(Some(ip))`: The previously stored IP
    /// - `Err(Error)`: The cache exists but could not be read
    async fn load(&self) -> Result<Option<Ipv4Addr>, crate::Error>;

    /// Overwrite the cached IP
    async fn store(&self, ip: Ipv4Addr) -> Result<(), crate::Error>;
}
