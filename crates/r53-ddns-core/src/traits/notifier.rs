// # Notifier Trait
//
// Defines the notification transport boundary.
//
// ## Implementations
//
// - Mail command: `MailCommandNotifier` (pipes the body to `mail`)
//
// Delivery is best-effort. Callers go through
// [`notify_best_effort`](crate::notify::notify_best_effort), which turns
// every failure into a warning.

use async_trait::async_trait;

/// Trait for notification transports
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `subject` and `body` to `recipient`
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), crate::Error>;

    /// Transport name (for logging)
    fn transport_name(&self) -> &'static str;
}
