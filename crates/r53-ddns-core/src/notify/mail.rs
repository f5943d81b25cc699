// # Mail Command Notifier
//
// Delivers notifications through a local `mail`-compatible command:
//
// ```text
// <command> -s <subject> <recipient>   (body on stdin)
// ```
//
// Transport configuration (MTA, relay, credentials) is entirely the host's.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::traits::Notifier;

/// Notifier that shells out to a `mail`-style command
#[derive(Debug, Clone)]
pub struct MailCommandNotifier {
    command: String,
}

impl MailCommandNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl Notifier for MailCommandNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let mut child = Command::new(&self.command)
            .arg("-s")
            .arg(subject)
            .arg(recipient)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::notify(format!("Failed to run '{}': {}", self.command, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // The command may exit without reading its input; its exit
            // status is what decides success.
            match stdin.write_all(body.as_bytes()).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => {
                    return Err(Error::notify(format!(
                        "Failed to write message to '{}': {}",
                        self.command, e
                    )));
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::notify(format!("Failed to wait for '{}': {}", self.command, e)))?;

        if !output.status.success() {
            return Err(Error::notify(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "mail"
    }
}
