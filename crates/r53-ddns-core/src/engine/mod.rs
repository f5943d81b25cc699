//! Reconciliation engine
//!
//! The [`Reconciler`] drives every desired record toward the resolved IP:
//!
//! ```text
//!  DesiredRecord ──► managed kind? ──no──► SkippedNonA
//!                         │ yes
//!                         ▼
//!                 get_record (retried) ──err──► Failed
//!                         │
//!                         ▼
//!                 value == ip? ──yes──► AlreadyCorrect
//!                         │ no
//!                         ▼
//!                 upsert_record (retried) ──err──► Failed
//!                         │
//!                         ▼
//!                      Updated
//! ```
//!
//! Records are processed strictly in order, one at a time. A failed record
//! never stops the ones after it. A record that already holds the IP is
//! never written, so repeated runs without an IP change are no-ops.
//!
//! [`Updater`] wraps one full batch pass around the reconciler.

mod run;

pub use run::{RunReport, Updater};

use std::fmt;
use std::net::Ipv4Addr;

use tracing::{debug, error, info};

use crate::records::{DesiredRecord, RecordKind};
use crate::retry::RetryPolicy;
use crate::traits::{DnsProvider, RecordChange};

/// Comment attached to every mutation
pub const CHANGE_COMMENT: &str = "Dynamic DNS update";

/// What happened to one record during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Kind is not managed; no remote call was made
    SkippedNonA { kind: RecordKind },
    /// Remote value already equals the IP; no mutation was issued
    AlreadyCorrect,
    /// Record was created or overwritten
    Updated {
        /// Value before the upsert (`None` if the record did not exist)
        previous: Option<String>,
    },
    /// Read or write failed after exhausting the retry budget
    Failed {
        /// Value before the attempt, if the read succeeded
        previous: Option<String>,
        error: String,
    },
}

/// Per-record result of a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    /// Record name
    pub name: String,
    /// Value the record should hold
    pub new_value: String,
    pub outcome: Outcome,
}

impl ReconciliationOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self.outcome, Outcome::Updated { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }

    /// Value before this pass, when known
    pub fn previous(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Updated { previous } | Outcome::Failed { previous, .. } => previous.as_deref(),
            Outcome::AlreadyCorrect => Some(&self.new_value),
            Outcome::SkippedNonA { .. } => None,
        }
    }
}

impl fmt::Display for ReconciliationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::SkippedNonA { kind } => {
                write!(f, "{}: skipped ({} record)", self.name, kind)
            }
            Outcome::AlreadyCorrect => {
                write!(f, "{}: already {}", self.name, self.new_value)
            }
            Outcome::Updated { previous } => write!(
                f,
                "{}: updated {} -> {}",
                self.name,
                previous.as_deref().unwrap_or("(none)"),
                self.new_value
            ),
            Outcome::Failed { error, .. } => {
                write!(f, "{}: FAILED to set {} ({})", self.name, self.new_value, error)
            }
        }
    }
}

/// Tally of outcomes by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub skipped: usize,
    pub already_correct: usize,
    pub updated: usize,
    pub failed: usize,
}

impl OutcomeCounts {
    pub fn tally(outcomes: &[ReconciliationOutcome]) -> Self {
        let mut counts = Self::default();
        for outcome in outcomes {
            match outcome.outcome {
                Outcome::SkippedNonA { .. } => counts.skipped += 1,
                Outcome::AlreadyCorrect => counts.already_correct += 1,
                Outcome::Updated { .. } => counts.updated += 1,
                Outcome::Failed { .. } => counts.failed += 1,
            }
        }
        counts
    }
}

/// Reconciles desired records against the remote DNS service
pub struct Reconciler {
    provider: Box<dyn DnsProvider>,
    retry: RetryPolicy,
}

impl Reconciler {
    pub fn new(provider: Box<dyn DnsProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Reconcile every record in `records` toward `ip`, in order
    pub async fn reconcile(
        &self,
        ip: Ipv4Addr,
        records: &[DesiredRecord],
    ) -> Vec<ReconciliationOutcome> {
        let new_value = ip.to_string();
        let mut outcomes = Vec::with_capacity(records.len());

        for record in records {
            let outcome = self.reconcile_record(record, &new_value).await;
            outcomes.push(ReconciliationOutcome {
                name: record.name.clone(),
                new_value: new_value.clone(),
                outcome,
            });
        }

        outcomes
    }

    async fn reconcile_record(&self, record: &DesiredRecord, new_value: &str) -> Outcome {
        if !record.kind.is_managed() {
            info!(
                "Skipping {} ({} records are not managed)",
                record.name, record.kind
            );
            return Outcome::SkippedNonA {
                kind: record.kind.clone(),
            };
        }

        let provider = self.provider.as_ref();
        let zone_id = record.zone_id.as_str();
        let name = record.name.as_str();
        let kind = &record.kind;

        let current = self
            .retry
            .run(&format!("Reading {} {}", kind, name), move || {
                provider.get_record(zone_id, name, kind)
            })
            .await;

        let previous = match current {
            Ok(Some(remote)) => Some(remote.value),
            Ok(None) => {
                debug!("{} {} does not exist in zone {}; it will be created", kind, name, zone_id);
                None
            }
            Err(e) => {
                error!("Failed to read {} {}: {}", kind, name, e);
                return Outcome::Failed {
                    previous: None,
                    error: e.to_string(),
                };
            }
        };

        if previous.as_deref() == Some(new_value) {
            info!("{} already points to {}", name, new_value);
            return Outcome::AlreadyCorrect;
        }

        info!(
            "Updating {} {} from {} to {} (ttl {}, comment: \"{}\")",
            kind,
            name,
            previous.as_deref().unwrap_or("(none)"),
            new_value,
            record.ttl,
            CHANGE_COMMENT
        );

        let change = RecordChange {
            zone_id,
            name,
            kind,
            ttl: record.ttl,
            value: new_value,
            comment: CHANGE_COMMENT,
        };
        let change = &change;

        let written = self
            .retry
            .run(&format!("Updating {} {}", kind, name), move || {
                provider.upsert_record(change)
            })
            .await;

        match written {
            Ok(()) => {
                info!("Updated {} -> {}", name, new_value);
                Outcome::Updated { previous }
            }
            Err(e) => {
                error!("Failed to update {} to {}: {}", name, new_value, e);
                Outcome::Failed {
                    previous,
                    error: e.to_string(),
                }
            }
        }
    }
}
