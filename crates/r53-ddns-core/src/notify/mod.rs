//! Run summaries and best-effort delivery
//!
//! A run produces at most one notification: when a record was updated, when
//! a record failed, or when no public IP could be resolved at all. Delivery
//! never fails the run; every problem becomes a warning.

mod mail;

pub use mail::MailCommandNotifier;

use std::net::Ipv4Addr;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::{OutcomeCounts, ReconciliationOutcome};
use crate::traits::Notifier;

/// A message ready to hand to a [`Notifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Summarize a reconciliation pass.
    ///
    /// Returns `None` when nothing was updated and nothing failed.
    pub fn from_outcomes(ip: Ipv4Addr, outcomes: &[ReconciliationOutcome]) -> Option<Self> {
        let counts = OutcomeCounts::tally(outcomes);
        if counts.updated == 0 && counts.failed == 0 {
            return None;
        }

        let subject = if counts.failed > 0 {
            "DNS Update Failed"
        } else {
            "DNS Update Successful"
        };

        let mut body = format!(
            "Public IP: {}\n\n{} updated, {} already correct, {} skipped, {} failed\n\n",
            ip, counts.updated, counts.already_correct, counts.skipped, counts.failed
        );
        for outcome in outcomes.iter().filter(|o| o.is_updated() || o.is_failed()) {
            body.push_str(&outcome.to_string());
            body.push('\n');
        }

        Some(Self {
            subject: subject.to_string(),
            body,
        })
    }

    /// Report that the run could not determine a public IP
    pub fn no_ip(error: &crate::Error) -> Self {
        Self {
            subject: "DNS Update Failed: no public IP".to_string(),
            body: format!(
                "The public IP address could not be determined, so no records were checked.\n\n{}\n",
                error
            ),
        }
    }
}

/// Deliver `notification` if notifications are enabled and addressed.
///
/// Never returns an error: a disabled switch is logged at debug level, a
/// missing recipient or a transport failure as a warning.
pub async fn notify_best_effort(
    config: &Config,
    notifier: &dyn Notifier,
    notification: &Notification,
) {
    if !config.notify.enabled {
        debug!(
            "Email notifications disabled; not sending '{}'",
            notification.subject
        );
        return;
    }

    let Some(recipient) = config.notification_recipient() else {
        warn!(
            "Email notifications enabled but EMAIL is not set; not sending '{}'",
            notification.subject
        );
        return;
    };

    match notifier
        .send(recipient, &notification.subject, &notification.body)
        .await
    {
        Ok(()) => info!(
            "Sent '{}' to {} via {}",
            notification.subject,
            recipient,
            notifier.transport_name()
        ),
        Err(e) => warn!(
            "Failed to send '{}' to {} via {}: {}",
            notification.subject,
            recipient,
            notifier.transport_name(),
            e
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Outcome;
    use crate::error::{Error, Result};
    use crate::records::RecordKind;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    const IP: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 7);

    fn outcome(name: &str, outcome: Outcome) -> ReconciliationOutcome {
        ReconciliationOutcome {
            name: name.to_string(),
            new_value: IP.to_string(),
            outcome,
        }
    }

    #[derive(Default)]
    struct Recording {
        sent: Arc<Mutex<Vec<(String, String)>>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for Recording {
        async fn send(&self, recipient: &str, subject: &str, _body: &str) -> Result<()> {
            if self.fail {
                return Err(Error::notify("transport unavailable"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipient.to_string(), subject.to_string()));
            Ok(())
        }

        fn transport_name(&self) -> &'static str {
            "recording"
        }
    }

    fn enabled_config() -> Config {
        let mut config = Config::default();
        config.notify.enabled = true;
        config.notify.email = Some("ops@example.com".to_string());
        config
    }

    #[test]
    fn quiet_runs_produce_no_notification() {
        let outcomes = vec![
            outcome("a.example.com", Outcome::AlreadyCorrect),
            outcome("b.example.com", Outcome::SkippedNonA { kind: RecordKind::Cname }),
        ];
        assert_eq!(Notification::from_outcomes(IP, &outcomes), None);
        assert_eq!(Notification::from_outcomes(IP, &[]), None);
    }

    #[test]
    fn updates_produce_success_summary() {
        let outcomes = vec![
            outcome("a.example.com", Outcome::Updated { previous: Some("198.51.100.1".into()) }),
            outcome("b.example.com", Outcome::AlreadyCorrect),
        ];
        let notification = Notification::from_outcomes(IP, &outcomes).unwrap();

        assert_eq!(notification.subject, "DNS Update Successful");
        assert!(notification.body.contains("a.example.com: updated 198.51.100.1 -> 203.0.113.7"));
        assert!(!notification.body.contains("b.example.com"));
    }

    #[test]
    fn any_failure_marks_summary_failed() {
        let outcomes = vec![
            outcome("a.example.com", Outcome::Updated { previous: None }),
            outcome("b.example.com", Outcome::Failed { previous: None, error: "throttled".into() }),
        ];
        let notification = Notification::from_outcomes(IP, &outcomes).unwrap();

        assert_eq!(notification.subject, "DNS Update Failed");
        assert!(notification.body.contains("1 updated"));
        assert!(notification.body.contains("1 failed"));
        assert!(notification.body.contains("throttled"));
    }

    #[tokio::test]
    async fn delivers_when_enabled() {
        let notifier = Recording::default();
        let sent = notifier.sent.clone();
        let notification = Notification::no_ip(&Error::no_ip("all failed"));

        notify_best_effort(&enabled_config(), &notifier, &notification).await;

        assert_eq!(
            *sent.lock().unwrap(),
            vec![("ops@example.com".to_string(), "DNS Update Failed: no public IP".to_string())]
        );
    }

    #[tokio::test]
    async fn disabled_or_unaddressed_sends_nothing() {
        let notifier = Recording::default();
        let sent = notifier.sent.clone();
        let notification = Notification::no_ip(&Error::no_ip("all failed"));

        let mut disabled = enabled_config();
        disabled.notify.enabled = false;
        notify_best_effort(&disabled, &notifier, &notification).await;

        let mut unaddressed = enabled_config();
        unaddressed.notify.email = None;
        notify_best_effort(&unaddressed, &notifier, &notification).await;

        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_swallowed() {
        let notifier = Recording {
            fail: true,
            ..Default::default()
        };
        let notification = Notification::no_ip(&Error::no_ip("all failed"));

        notify_best_effort(&enabled_config(), &notifier, &notification).await;
    }
}
