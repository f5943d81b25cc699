// # IP Lookup Trait
//
// Defines the interface for querying a public-IP endpoint.
//
// ## Implementations
//
// - HTTP GET: `r53-ddns-ip-http` crate
//
// Implementations only fetch the raw body. Validation and endpoint fallback
// are owned by [`IpResolver`](crate::ip::IpResolver).

use async_trait::async_trait;

/// Trait for fetching the body returned by a public-IP endpoint
#[async_trait]
pub trait IpLookup: Send + Sync {
    /// Fetch the response body from `endpoint`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The raw body, expected to be a dotted-quad
    /// - `Err(Error)`: The endpoint was unreachable, timed out or answered
    ///   with a non-success status
    async fn fetch(&self, endpoint: &str) -> Result<String, crate::Error>;
}
