// # HTTP IP Lookup
//
// This crate provides the HTTP implementation of `IpLookup` for the
// Route 53 DDNS updater.
//
// ## Behavior
//
// One GET per call, bounded by the configured timeout. A non-2xx status or
// an unreadable body is an error; the body itself is returned untouched.
// Trimming and dotted-quad validation belong to `IpResolver`, so an
// endpoint answering garbage is handled the same way as one that is down.

use r53_ddns_core::traits::IpLookup;
use r53_ddns_core::{Error, Result};

use std::time::Duration;

use tracing::debug;

const USER_AGENT: &str = concat!("route53-ddns/", env!("CARGO_PKG_VERSION"));

/// Public IP lookup over plain HTTP(S) GET
#[derive(Debug, Clone)]
pub struct HttpIpLookup {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpIpLookup {
    /// Create a lookup whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }
}

#[async_trait::async_trait]
impl IpLookup for HttpIpLookup {
    async fn fetch(&self, endpoint: &str) -> Result<String> {
        let response = self.client.get(endpoint).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::ip_lookup(format!("Request timed out after {}s", self.timeout.as_secs()))
            } else {
                Error::ip_lookup(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ip_lookup(format!("HTTP error: {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_lookup(format!("Failed to read response: {}", e)))?;

        debug!("{} answered {} bytes", endpoint, body.len());
        Ok(body)
    }
}
