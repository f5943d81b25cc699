// # Updater
//
// One complete batch pass:
//
// ```text
// resolve IP ──► compare with cache ──► store new IP ──► load hosts document
//      │                                                       │
//      └─ fatal (notify)                                       ▼
//                                  notify ◄── summary ◄── reconcile records
// ```
//
// The cache only changes how the run is described in the logs. Every record
// is still checked against the remote, unless the deprecated
// skip-if-unchanged switch is on.

use std::net::Ipv4Addr;
use std::path::Path;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::engine::{OutcomeCounts, ReconciliationOutcome, Reconciler};
use crate::error::Result;
use crate::ip::IpResolver;
use crate::notify::{Notification, notify_best_effort};
use crate::records;
use crate::retry::RetryPolicy;
use crate::traits::{DnsProvider, IpCache, IpLookup, Notifier};

/// Result of one [`Updater::run_once`] pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Resolved public IP
    pub ip: Ipv4Addr,
    /// IP recorded by the previous run, if any
    pub previous_ip: Option<Ipv4Addr>,
    /// Per-record outcomes, in document order
    pub outcomes: Vec<ReconciliationOutcome>,
    /// Whether the records were reconciled at all
    pub swept: bool,
}

impl RunReport {
    pub fn counts(&self) -> OutcomeCounts {
        OutcomeCounts::tally(&self.outcomes)
    }

    pub fn ip_changed(&self) -> bool {
        self.previous_ip != Some(self.ip)
    }
}

/// Orchestrates a single update run
pub struct Updater {
    config: Config,
    resolver: IpResolver,
    reconciler: Reconciler,
    cache: Box<dyn IpCache>,
    notifier: Box<dyn Notifier>,
}

impl Updater {
    pub fn new(
        config: &Config,
        lookup: Box<dyn IpLookup>,
        provider: Box<dyn DnsProvider>,
        cache: Box<dyn IpCache>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            resolver: IpResolver::new(lookup, config.ip_lookup.endpoints()),
            reconciler: Reconciler::new(provider, RetryPolicy::from(&config.retry)),
            config: config.clone(),
            cache,
            notifier,
        }
    }

    fn hosts_file(&self) -> &Path {
        &self.config.paths.hosts_file
    }

    /// Run one pass.
    ///
    /// # Errors
    ///
    /// - `Error::NoIpAvailable`: no endpoint produced a valid address
    /// - `Error::NotFound` / `Error::InvalidFormat`: hosts document missing or malformed
    ///
    /// Per-record failures are reported in the returned [`RunReport`], not
    /// as an error.
    pub async fn run_once(&self) -> Result<RunReport> {
        info!("Starting DNS update run (provider: {})", self.reconciler.provider_name());

        let ip = match self.resolver.resolve().await {
            Ok(ip) => ip,
            Err(e) => {
                error!("Could not determine public IP: {}", e);
                notify_best_effort(&self.config, self.notifier.as_ref(), &Notification::no_ip(&e))
                    .await;
                return Err(e);
            }
        };

        let previous_ip = match self.cache.load().await {
            Ok(previous) => previous,
            Err(e) => {
                warn!("Could not read cached IP: {}", e);
                None
            }
        };

        match previous_ip {
            Some(previous) if previous == ip => {
                info!("IP unchanged since last run ({}); verifying records", ip)
            }
            Some(previous) => info!("IP changed from {} to {}", previous, ip),
            None => info!("No cached IP; current IP is {}", ip),
        }

        if previous_ip != Some(ip) {
            if let Err(e) = self.cache.store(ip).await {
                warn!("Could not update cached IP: {}", e);
            }
        }

        if self.config.skip_if_ip_unchanged {
            warn!("SKIP_IF_IP_UNCHANGED is deprecated; records are verified against Route 53 on every run");
            if previous_ip == Some(ip) {
                info!("Skipping record checks because the IP is unchanged");
                return Ok(RunReport {
                    ip,
                    previous_ip,
                    outcomes: Vec::new(),
                    swept: false,
                });
            }
        }

        let records = records::load(self.hosts_file()).await.inspect_err(|e| {
            error!("Could not load hosts from {}: {}", self.hosts_file().display(), e)
        })?;

        if records.is_empty() {
            info!("No records configured in {}; nothing to do", self.hosts_file().display());
            return Ok(RunReport {
                ip,
                previous_ip,
                outcomes: Vec::new(),
                swept: true,
            });
        }

        info!("Checking {} record(s) against {}", records.len(), ip);
        let outcomes = self.reconciler.reconcile(ip, &records).await;

        let counts = OutcomeCounts::tally(&outcomes);
        let summary = format!(
            "Run complete: {} updated, {} already correct, {} skipped, {} failed",
            counts.updated, counts.already_correct, counts.skipped, counts.failed
        );
        if counts.failed > 0 {
            warn!("{}", summary);
        } else {
            info!("{}", summary);
        }

        if let Some(notification) = Notification::from_outcomes(ip, &outcomes) {
            notify_best_effort(&self.config, self.notifier.as_ref(), &notification).await;
        }

        Ok(RunReport {
            ip,
            previous_ip,
            outcomes,
            swept: true,
        })
    }
}
