//! Desired-state store
//!
//! Loads the list of records the updater manages from a JSON document:
//!
//! ```json
//! {
//!   "records": [
//!     { "name": "home.example.com", "zone_id": "Z0123456789ABC" },
//!     { "name": "vpn.example.com", "zone_id": "Z0123456789ABC", "ttl": 60 },
//!     { "name": "www.example.com", "zone_id": "Z0123456789ABC", "type": "CNAME" }
//!   ]
//! }
//! ```
//!
//! `type` defaults to `"A"` and `ttl` to 300 seconds. The document is re-read
//! on every run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// TTL applied when a record does not specify one
pub const DEFAULT_TTL: u32 = 300;

/// DNS record kind
///
/// Only [`RecordKind::A`] is managed; every other kind, including ones this
/// program has never heard of, is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordKind {
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Txt,
    Other(String),
}

impl RecordKind {
    /// Whether the updater writes records of this kind
    pub fn is_managed(&self) -> bool {
        matches!(self, RecordKind::A)
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecordKind::A => "A",
            RecordKind::Aaaa => "AAAA",
            RecordKind::Cname => "CNAME",
            RecordKind::Mx => "MX",
            RecordKind::Ns => "NS",
            RecordKind::Txt => "TXT",
            RecordKind::Other(kind) => kind,
        }
    }
}

impl From<String> for RecordKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "A" => RecordKind::A,
            "AAAA" => RecordKind::Aaaa,
            "CNAME" => RecordKind::Cname,
            "MX" => RecordKind::Mx,
            "NS" => RecordKind::Ns,
            "TXT" => RecordKind::Txt,
            _ => RecordKind::Other(value),
        }
    }
}

impl From<&str> for RecordKind {
    fn from(value: &str) -> Self {
        RecordKind::from(value.to_string())
    }
}

impl From<RecordKind> for String {
    fn from(kind: RecordKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_kind() -> RecordKind {
    RecordKind::A
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

/// One record the updater should keep pointed at the public IP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredRecord {
    /// Fully-qualified domain name
    pub name: String,

    /// Hosted zone that owns `name`
    pub zone_id: String,

    /// Record kind
    #[serde(rename = "type", default = "default_kind")]
    pub kind: RecordKind,

    /// Time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl DesiredRecord {
    /// Create an A record with the default TTL
    pub fn new(name: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone_id: zone_id.into(),
            kind: RecordKind::A,
            ttl: DEFAULT_TTL,
        }
    }

    /// Set the record kind
    pub fn with_kind(mut self, kind: impl Into<RecordKind>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_format(format!(
                "records[{}]: name cannot be empty",
                index
            )));
        }
        if self.zone_id.trim().is_empty() {
            return Err(Error::invalid_format(format!(
                "records[{}] ({}): zone_id cannot be empty",
                index, self.name
            )));
        }
        if self.ttl == 0 {
            return Err(Error::invalid_format(format!(
                "records[{}] ({}): ttl must be a positive number of seconds",
                index, self.name
            )));
        }
        Ok(())
    }
}

/// On-disk document format
#[derive(Debug, Deserialize)]
struct HostsDocument {
    records: Vec<DesiredRecord>,
}

/// Parse a desired-state document
pub fn parse(content: &str) -> Result<Vec<DesiredRecord>> {
    let document: HostsDocument = serde_json::from_str(content)
        .map_err(|e| Error::invalid_format(format!("Hosts document is not valid: {}", e)))?;

    for (index, record) in document.records.iter().enumerate() {
        record.validate(index)?;
    }

    Ok(document.records)
}

/// Load the desired-state document at `path`
pub async fn load(path: &Path) -> Result<Vec<DesiredRecord>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::not_found(format!(
                "Hosts file {} does not exist",
                path.display()
            )));
        }
        Err(e) => {
            return Err(Error::not_found(format!(
                "Hosts file {} cannot be read: {}",
                path.display(),
                e
            )));
        }
    };

    let records = parse(&content).map_err(|e| match e {
        Error::InvalidFormat(msg) => Error::invalid_format(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;

    tracing::debug!("Loaded {} record(s) from {}", records.len(), path.display());
    Ok(records)
}
