//! Public IP resolution
//!
//! [`IpResolver`] walks the configured endpoints in order (primary first,
//! then each fallback) and returns the first body that is a well-formed
//! dotted-quad. An endpoint that answers with anything else is treated the
//! same as one that is unreachable.

use std::net::Ipv4Addr;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::traits::IpLookup;

/// Parse a strict dotted-quad IPv4 address.
///
/// Exactly four `.`-separated segments, each one to three ASCII digits with
/// a value of at most 255. No surrounding whitespace, signs or other
/// characters are accepted.
pub fn parse_ipv4(value: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut segments = value.split('.');

    for octet in octets.iter_mut() {
        let segment = segments.next()?;
        if segment.is_empty() || segment.len() > 3 || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = segment.parse::<u8>().ok()?;
    }

    if segments.next().is_some() {
        return None;
    }

    Some(Ipv4Addr::from(octets))
}

/// Whether `value` is a strict dotted-quad IPv4 address
pub fn is_valid_ipv4(value: &str) -> bool {
    parse_ipv4(value).is_some()
}

/// Resolves the host's public IPv4 address with ordered fallback
pub struct IpResolver {
    lookup: Box<dyn IpLookup>,
    endpoints: Vec<String>,
}

impl IpResolver {
    /// Create a resolver trying `endpoints` in order
    pub fn new(lookup: Box<dyn IpLookup>, endpoints: Vec<String>) -> Self {
        Self { lookup, endpoints }
    }

    /// Resolve the current public IP
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: First valid address returned by an endpoint
    /// - `Err(Error::NoIpAvailable)`: Every endpoint failed
    pub async fn resolve(&self) -> Result<Ipv4Addr> {
        let mut failures = Vec::with_capacity(self.endpoints.len());

        for endpoint in &self.endpoints {
            debug!("Querying IP service {}", endpoint);

            match self.lookup.fetch(endpoint).await {
                Ok(body) => {
                    let candidate = body.trim();
                    match parse_ipv4(candidate) {
                        Some(ip) => {
                            info!("Public IP {} obtained from {}", ip, endpoint);
                            return Ok(ip);
                        }
                        None => {
                            warn!(
                                "IP service {} returned an invalid address: '{}'",
                                endpoint,
                                truncate(candidate, 64)
                            );
                            failures.push(format!("{}: invalid response", endpoint));
                        }
                    }
                }
                Err(e) => {
                    warn!("IP service {} failed: {}", endpoint, e);
                    failures.push(format!("{}: {}", endpoint, e));
                }
            }
        }

        if failures.is_empty() {
            return Err(Error::no_ip("no IP services configured"));
        }

        Err(Error::no_ip(format!(
            "all {} IP service(s) failed ({})",
            failures.len(),
            failures.join("; ")
        )))
    }
}

fn truncate(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}
