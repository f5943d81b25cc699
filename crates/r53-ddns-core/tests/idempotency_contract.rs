//! Contract Test: Idempotency
//!
//! This test verifies that repeating a run without an IP change never
//! mutates the remote DNS service.
//!
//! Constraints verified:
//! - A record that already holds the IP is read but never written
//! - A second reconcile with the same IP issues zero mutations
//! - The IP cache does not short-circuit verification (drift is repaired)
//!
//! If this test fails, repeated scheduled runs will hammer the DNS API.

mod common;

use common::*;
use r53_ddns_core::engine::{Outcome, Reconciler, Updater};
use r53_ddns_core::records::DesiredRecord;
use r53_ddns_core::retry::RetryPolicy;
use r53_ddns_core::state::MemoryIpCache;
use std::net::Ipv4Addr;

const IP: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 7);

#[tokio::test]
async fn second_reconcile_with_same_ip_issues_no_mutations() {
    let provider = MemoryDnsProvider::new();
    let reconciler = Reconciler::new(
        Box::new(MemoryDnsProvider::sharing_counters_with(&provider)),
        RetryPolicy::no_retry(),
    );
    let records = vec![
        DesiredRecord::new("home.example.com", ZONE),
        DesiredRecord::new("vpn.example.com", ZONE),
    ];

    let first = reconciler.reconcile(IP, &records).await;
    assert!(first.iter().all(|o| o.is_updated()), "got {:?}", first);
    assert_eq!(provider.upsert_call_count(), 2);

    let second = reconciler.reconcile(IP, &records).await;
    assert!(
        second.iter().all(|o| o.outcome == Outcome::AlreadyCorrect),
        "got {:?}",
        second
    );
    assert_eq!(
        provider.upsert_call_count(),
        2,
        "Second pass with an unchanged IP must not write"
    );
    assert_eq!(provider.get_call_count(), 4, "Every pass reads every record");
}

#[tokio::test]
async fn remote_name_comparison_ignores_root_dot_and_case() {
    let provider = MemoryDnsProvider::new().with_record(ZONE, "Home.Example.com.", "203.0.113.7");
    let reconciler = Reconciler::new(
        Box::new(MemoryDnsProvider::sharing_counters_with(&provider)),
        RetryPolicy::no_retry(),
    );

    let outcomes = reconciler
        .reconcile(IP, &[DesiredRecord::new("home.example.com", ZONE)])
        .await;

    assert_eq!(outcomes[0].outcome, Outcome::AlreadyCorrect);
    assert_eq!(provider.upsert_call_count(), 0);
}

#[tokio::test]
async fn repeated_runs_write_once() {
    let dir = tempfile::tempdir().unwrap();
    write_hosts(dir.path(), &hosts_document(&["home.example.com"]));
    let config = test_config(dir.path());

    let provider = MemoryDnsProvider::new().with_record(ZONE, "home.example.com", "198.51.100.1");
    let cache = MemoryIpCache::new();

    for _ in 0..3 {
        let updater = Updater::new(
            &config,
            Box::new(ScriptedIpLookup::answering("203.0.113.7")),
            Box::new(MemoryDnsProvider::sharing_counters_with(&provider)),
            Box::new(cache.clone()),
            Box::new(RecordingNotifier::new()),
        );
        updater.run_once().await.unwrap();
    }

    assert_eq!(provider.upsert_call_count(), 1);
    assert_eq!(provider.get_call_count(), 3);
    assert_eq!(
        provider.value_of(ZONE, "home.example.com").as_deref(),
        Some("203.0.113.7")
    );
}

#[tokio::test]
async fn drift_is_repaired_even_when_cached_ip_is_unchanged() {
    // Someone edited the record by hand; the cache still says 203.0.113.7
    let dir = tempfile::tempdir().unwrap();
    write_hosts(dir.path(), &hosts_document(&["home.example.com"]));
    let config = test_config(dir.path());

    let provider = MemoryDnsProvider::new().with_record(ZONE, "home.example.com", "192.0.2.99");
    let updater = Updater::new(
        &config,
        Box::new(ScriptedIpLookup::answering("203.0.113.7")),
        Box::new(MemoryDnsProvider::sharing_counters_with(&provider)),
        Box::new(MemoryIpCache::with_ip(IP)),
        Box::new(RecordingNotifier::new()),
    );

    let report = updater.run_once().await.unwrap();

    assert!(!report.ip_changed());
    assert!(report.swept);
    assert_eq!(
        report.outcomes[0].outcome,
        Outcome::Updated {
            previous: Some("192.0.2.99".to_string())
        }
    );
    assert_eq!(
        provider.value_of(ZONE, "home.example.com").as_deref(),
        Some("203.0.113.7")
    );
}
