//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces at the edges of a run.
//!
//! - [`DnsProvider`]: Read and upsert records in the remote DNS service
//! - [`IpLookup`]: Fetch the body of a public-IP endpoint
//! - [`IpCache`]: Remember the IP observed by the previous run
//! - [`Notifier`]: Deliver run summaries

pub mod dns_provider;
pub mod ip_cache;
pub mod ip_lookup;
pub mod notifier;

pub use dns_provider::{DnsProvider, RecordChange, RemoteRecord, canonical_name, names_match};
pub use ip_cache::IpCache;
pub use ip_lookup::IpLookup;
pub use notifier::Notifier;
