// # DNS Provider Trait
//
// Defines the boundary to the remote DNS service.
//
// ## Implementations
//
// - Route 53: `r53-ddns-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use r53_ddns_core::{DnsProvider, RecordChange, RecordKind};
//
// let current = provider
//     .get_record("Z0123456789ABC", "home.example.com", &RecordKind::A)
//     .await?;
//
// provider.upsert_record(&RecordChange {
//     zone_id: "Z0123456789ABC",
//     name: "home.example.com",
//     kind: &RecordKind::A,
//     ttl: 300,
//     value: "203.0.113.7",
//     comment: "Dynamic DNS update",
// }).await?;
// ```

use async_trait::async_trait;

use crate::records::RecordKind;

/// Value currently published for a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    /// First resource record value (the address, for A records)
    pub value: String,
    /// Advertised TTL, if the service reports one
    pub ttl: Option<u32>,
}

/// An update-or-insert mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange<'a> {
    pub zone_id: &'a str,
    pub name: &'a str,
    pub kind: &'a RecordKind,
    pub ttl: u32,
    pub value: &'a str,
    /// Free-form change comment; logged, not interpreted
    pub comment: &'a str,
}

/// Trait for remote DNS service implementations
///
/// Providers execute exactly one remote operation per call. Retries, delays
/// and the decision whether a write is needed belong to the
/// [`Reconciler`](crate::engine::Reconciler).
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Read the current value of `(zone_id, name, kind)`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))`: The record exists
    /// - `Ok(None)`: The service answered that no such record exists
    /// - `Err(Error)`: The read failed and may be retried
    async fn get_record(
        &self,
        zone_id: &str,
        name: &str,
        kind: &RecordKind,
    ) -> Result<Option<RemoteRecord>, crate::Error>;

    /// Create the record if absent, otherwise overwrite its value
    async fn upsert_record(&self, change: &RecordChange<'_>) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Canonical form of a record name: `\ooo` octal escapes decoded, the
/// trailing root dot dropped, ASCII lowercased.
///
/// Route 53 lists names escaped, so `*.example.com` comes back as
/// `\052.example.com.`.
pub fn canonical_name(name: &str) -> String {
    let bytes = name.trim_end_matches('.').as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if let Some(byte) = octal_escape(&bytes[i + 1..]) {
                decoded.push(byte);
                i += 4;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    decoded.make_ascii_lowercase();
    String::from_utf8_lossy(&decoded).into_owned()
}

/// Value of a leading three-digit octal escape body, if `rest` starts with one
fn octal_escape(rest: &[u8]) -> Option<u8> {
    let digits = rest.get(..3)?;
    if !digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
        return None;
    }
    let value = digits
        .iter()
        .fold(0u16, |acc, d| acc * 8 + u16::from(d - b'0'));
    u8::try_from(value).ok()
}

/// Compare two record names by their canonical form
pub fn names_match(a: &str, b: &str) -> bool {
    canonical_name(a) == canonical_name(b)
}
