//! Test doubles and common utilities for contract tests
//!
//! Every double records its calls behind `Arc`s so a test can keep a handle
//! (via `sharing_counters_with`) after the original is boxed into the engine.

#![allow(dead_code)]

use r53_ddns_core::config::Config;
use r53_ddns_core::error::{Error, Result};
use r53_ddns_core::records::RecordKind;
use r53_ddns_core::traits::{
    DnsProvider, IpLookup, Notifier, RecordChange, RemoteRecord, canonical_name, names_match,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ZONE: &str = "Z0000000000TEST";

/// One upsert as seen by [`MemoryDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpsert {
    pub zone_id: String,
    pub name: String,
    pub value: String,
    pub ttl: u32,
    pub comment: String,
}

/// In-memory DNS service with call recording and scripted failures
pub struct MemoryDnsProvider {
    records: Arc<Mutex<HashMap<(String, String), RemoteRecord>>>,
    get_call_count: Arc<AtomicUsize>,
    upsert_call_count: Arc<AtomicUsize>,
    read_order: Arc<Mutex<Vec<String>>>,
    upserts: Arc<Mutex<Vec<RecordedUpsert>>>,
    /// Remaining scripted failures per record name
    failing_reads: Arc<Mutex<HashMap<String, usize>>>,
    failing_writes: Arc<Mutex<HashMap<String, usize>>>,
}

fn key(zone_id: &str, name: &str) -> (String, String) {
    (zone_id.to_string(), canonical_name(name))
}

fn take_failure(script: &Mutex<HashMap<String, usize>>, name: &str) -> bool {
    let mut script = script.lock().unwrap();
    match script.iter_mut().find(|(n, _)| names_match(n, name)) {
        Some((_, remaining)) if *remaining > 0 => {
            *remaining -= 1;
            true
        }
        _ => false,
    }
}

impl MemoryDnsProvider {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            get_call_count: Arc::new(AtomicUsize::new(0)),
            upsert_call_count: Arc::new(AtomicUsize::new(0)),
            read_order: Arc::new(Mutex::new(Vec::new())),
            upserts: Arc::new(Mutex::new(Vec::new())),
            failing_reads: Arc::new(Mutex::new(HashMap::new())),
            failing_writes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Pre-populate a published A record
    pub fn with_record(self, zone_id: &str, name: &str, value: &str) -> Self {
        self.records.lock().unwrap().insert(
            key(zone_id, name),
            RemoteRecord {
                value: value.to_string(),
                ttl: Some(300),
            },
        );
        self
    }

    /// Fail the next `times` reads of `name`
    pub fn fail_reads(self, name: &str, times: usize) -> Self {
        self.failing_reads
            .lock()
            .unwrap()
            .insert(name.to_string(), times);
        self
    }

    /// Fail the next `times` writes of `name`
    pub fn fail_writes(self, name: &str, times: usize) -> Self {
        self.failing_writes
            .lock()
            .unwrap()
            .insert(name.to_string(), times);
        self
    }

    /// Create a new provider that shares state and counters with `other`
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            records: Arc::clone(&other.records),
            get_call_count: Arc::clone(&other.get_call_count),
            upsert_call_count: Arc::clone(&other.upsert_call_count),
            read_order: Arc::clone(&other.read_order),
            upserts: Arc::clone(&other.upserts),
            failing_reads: Arc::clone(&other.failing_reads),
            failing_writes: Arc::clone(&other.failing_writes),
        }
    }

    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    pub fn upsert_call_count(&self) -> usize {
        self.upsert_call_count.load(Ordering::SeqCst)
    }

    /// Names passed to `get_record`, in call order
    pub fn read_order(&self) -> Vec<String> {
        self.read_order.lock().unwrap().clone()
    }

    /// Successful upserts, in call order
    pub fn upserts(&self) -> Vec<RecordedUpsert> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn value_of(&self, zone_id: &str, name: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .get(&key(zone_id, name))
            .map(|r| r.value.clone())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MemoryDnsProvider {
    async fn get_record(
        &self,
        zone_id: &str,
        name: &str,
        kind: &RecordKind,
    ) -> Result<Option<RemoteRecord>> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        self.read_order.lock().unwrap().push(name.to_string());

        assert_eq!(kind, &RecordKind::A, "only A records may be read");

        if take_failure(&self.failing_reads, name) {
            return Err(Error::provider("memory", format!("scripted read failure for {}", name)));
        }

        Ok(self.records.lock().unwrap().get(&key(zone_id, name)).cloned())
    }

    async fn upsert_record(&self, change: &RecordChange<'_>) -> Result<()> {
        self.upsert_call_count.fetch_add(1, Ordering::SeqCst);

        if take_failure(&self.failing_writes, change.name) {
            return Err(Error::provider(
                "memory",
                format!("scripted write failure for {}", change.name),
            ));
        }

        self.records.lock().unwrap().insert(
            key(change.zone_id, change.name),
            RemoteRecord {
                value: change.value.to_string(),
                ttl: Some(change.ttl),
            },
        );
        self.upserts.lock().unwrap().push(RecordedUpsert {
            zone_id: change.zone_id.to_string(),
            name: change.name.to_string(),
            value: change.value.to_string(),
            ttl: change.ttl,
            comment: change.comment.to_string(),
        });
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

/// IP lookup answering from a fixed endpoint table
pub struct ScriptedIpLookup {
    responses: Arc<HashMap<String, std::result::Result<String, String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedIpLookup {
    pub fn new(entries: &[(&str, std::result::Result<&str, &str>)]) -> Self {
        Self {
            responses: Arc::new(
                entries
                    .iter()
                    .map(|&(endpoint, response)| {
                        (
                            endpoint.to_string(),
                            response.map(str::to_string).map_err(str::to_string),
                        )
                    })
                    .collect(),
            ),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Primary endpoint answers with `ip`
    pub fn answering(ip: &str) -> Self {
        Self::new(&[(PRIMARY, Ok(ip))])
    }

    /// Every endpoint is unreachable
    pub fn unreachable() -> Self {
        Self::new(&[])
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            responses: Arc::clone(&other.responses),
            calls: Arc::clone(&other.calls),
        }
    }

    /// Endpoints queried, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IpLookup for ScriptedIpLookup {
    async fn fetch(&self, endpoint: &str) -> Result<String> {
        self.calls.lock().unwrap().push(endpoint.to_string());
        match self.responses.get(endpoint) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(msg)) => Err(Error::ip_lookup(msg.clone())),
            None => Err(Error::ip_lookup("connection refused")),
        }
    }
}

/// A notification captured by [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Notifier that records what it was asked to send
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// A notifier whose transport is always down
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            sent: Arc::clone(&other.sent),
            fail: other.fail,
        }
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent().into_iter().map(|n| n.subject).collect()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        if self.fail {
            return Err(Error::notify("mail transport unavailable"));
        }
        self.sent.lock().unwrap().push(SentNotification {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "recording"
    }
}

pub const PRIMARY: &str = "http://primary.test";
pub const FALLBACK: &str = "http://fallback.test";
pub const RECIPIENT: &str = "ops@example.com";

/// Config pointing at files under `dir`, with test endpoints, no retry delay
/// and notifications enabled
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.paths.hosts_file = dir.join("hosts.json");
    config.paths.ip_cache_file = dir.join("last_ip");
    config.ip_lookup.primary = PRIMARY.to_string();
    config.ip_lookup.fallbacks = vec![FALLBACK.to_string()];
    config.retry.max_retries = 3;
    config.retry.retry_delay_secs = 0;
    config.logging.file = None;
    config.notify.enabled = true;
    config.notify.email = Some(RECIPIENT.to_string());
    config
}

/// Write a hosts document into `dir`
pub fn write_hosts(dir: &Path, content: &str) {
    std::fs::write(dir.join("hosts.json"), content).unwrap();
}

/// Hosts document with one A record per name in [`ZONE`]
pub fn hosts_document(names: &[&str]) -> String {
    let records: Vec<serde_json::Value> = names
        .iter()
        .map(|name| serde_json::json!({ "name": name, "zone_id": ZONE }))
        .collect();
    serde_json::json!({ "records": records }).to_string()
}
