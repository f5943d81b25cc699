// # r53-ddns-core
//
// Core library for the Route 53 dynamic DNS updater.
//
// ## Architecture Overview
//
// One run is a single batch pass that converges a set of DNS A records
// toward the host's current public IPv4 address:
// - **IpLookup**: Fetch the body of a public-IP endpoint (`ip::IpResolver` adds ordered fallback and validation)
// - **DnsProvider**: Read and upsert records in the remote DNS service
// - **IpCache**: Remember the IP observed by the previous run
// - **Notifier**: Deliver a summary of the run
// - **Reconciler**: Drive each desired record toward the IP, with bounded retries
// - **Updater**: Orchestrate one complete run
//
// ## Design Principles
//
// 1. **Library-First**: The binary only wires concrete implementations together
// 2. **Always Verify**: Records are compared against the remote on every run
// 3. **Isolation**: One record's failure never aborts the others
// 4. **Idempotency**: A record that already holds the IP is never written

pub mod config;
pub mod engine;
pub mod error;
pub mod ip;
pub mod notify;
pub mod records;
pub mod retry;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{Config, LoadedConfig, LogLevel};
pub use engine::{Outcome, ReconciliationOutcome, Reconciler, RunReport, Updater};
pub use error::{Error, Result};
pub use ip::{IpResolver, is_valid_ipv4, parse_ipv4};
pub use notify::{MailCommandNotifier, Notification};
pub use records::{DesiredRecord, RecordKind};
pub use retry::RetryPolicy;
pub use state::{FileIpCache, MemoryIpCache};
pub use traits::{DnsProvider, IpCache, IpLookup, Notifier};
