//! Configuration types for the Route 53 DDNS updater
//!
//! Configuration is built once at startup from built-in defaults overlaid
//! with an optional environment-style override file:
//!
//! ```text
//! # /etc/route53-ddns/config.env
//! EMAIL="ops@example.com"
//! ENABLE_EMAIL_NOTIFICATIONS=true
//! FALLBACK_IP_SERVICES="https://api.ipify.org https://icanhazip.com"
//! export MAX_RETRIES=5
//! ```
//!
//! Keys missing from the file keep their defaults. The resulting [`Config`]
//! is immutable and passed by reference to every component.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default primary IP lookup endpoint
pub const DEFAULT_IP_SERVICE: &str = "https://checkip.amazonaws.com";

/// Default fallback IP lookup endpoints, tried in order
pub const DEFAULT_FALLBACK_IP_SERVICES: &[&str] = &[
    "https://api.ipify.org",
    "https://ifconfig.me/ip",
    "https://icanhazip.com",
];

/// Verbosity threshold for log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name, accepting `WARNING` as an alias of `WARN`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "WARN" | "WARNING" => Some(Self::Warn),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Main updater configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Notification settings
    pub notify: NotifyConfig,

    /// Paths to the desired-state document and the IP cache
    pub paths: PathsConfig,

    /// Public IP lookup settings
    pub ip_lookup: IpLookupConfig,

    /// Retry policy for remote reads and writes
    pub retry: RetryConfig,

    /// Log output settings
    pub logging: LoggingConfig,

    /// AWS credential and region selectors
    pub aws: AwsConfig,

    /// Log intended mutations instead of submitting them
    pub dry_run: bool,

    /// Skip the remote sweep when the cached IP matches the observed one.
    ///
    /// Deprecated: a matching cache says nothing about out-of-band edits to
    /// the records, so the default always verifies against Route 53.
    pub skip_if_ip_unchanged: bool,
}

/// Notification configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Recipient address
    pub email: Option<String>,
    /// Master switch for notifications
    pub enabled: bool,
    /// Command used to deliver mail (`<cmd> -s <subject> <recipient>`)
    pub mail_command: String,
}

/// File locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Desired-state document
    pub hosts_file: PathBuf,
    /// Last observed public IP
    pub ip_cache_file: PathBuf,
}

/// IP lookup configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpLookupConfig {
    /// Endpoint tried first
    pub primary: String,
    /// Endpoints tried after the primary, in order
    pub fallbacks: Vec<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl IpLookupConfig {
    /// All endpoints in resolution order
    pub fn endpoints(&self) -> Vec<String> {
        std::iter::once(self.primary.clone())
            .chain(self.fallbacks.iter().cloned())
            .filter(|endpoint| !endpoint.is_empty())
            .collect()
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per remote operation
    pub max_retries: u32,
    /// Delay between attempts (in seconds)
    pub retry_delay_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level written
    pub level: LogLevel,
    /// Emit single-line JSON objects instead of human-readable lines
    pub json: bool,
    /// Log file appended to in addition to the console
    pub file: Option<PathBuf>,
}

/// AWS selectors, handed to the SDK's default credential chain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsConfig {
    pub profile: Option<String>,
    pub region: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notify: NotifyConfig {
                email: None,
                enabled: false,
                mail_command: "mail".to_string(),
            },
            paths: PathsConfig {
                hosts_file: PathBuf::from("/etc/route53-ddns/hosts.json"),
                ip_cache_file: PathBuf::from("/var/lib/route53-ddns/last_ip"),
            },
            ip_lookup: IpLookupConfig {
                primary: DEFAULT_IP_SERVICE.to_string(),
                fallbacks: DEFAULT_FALLBACK_IP_SERVICES
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                timeout_secs: 10,
            },
            retry: RetryConfig {
                max_retries: 3,
                retry_delay_secs: 5,
            },
            logging: LoggingConfig {
                level: LogLevel::Info,
                json: false,
                file: Some(PathBuf::from("/var/log/route53-ddns.log")),
            },
            aws: AwsConfig::default(),
            dry_run: false,
            skip_if_ip_unchanged: false,
        }
    }
}

/// Result of loading configuration
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration
    pub config: Config,
    /// Override file actually read, if any
    pub source: Option<PathBuf>,
    /// Keys present in the override file that are not recognized
    pub unknown_keys: Vec<String>,
}

impl Config {
    /// Load defaults overlaid with the override file at `path`.
    ///
    /// A missing file is not an error; the defaults are returned unchanged.
    pub fn load(path: &Path) -> Result<LoadedConfig> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LoadedConfig {
                    config: Self::default(),
                    source: None,
                    unknown_keys: Vec::new(),
                });
            }
            Err(e) => {
                return Err(Error::config(format!(
                    "Failed to read config file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut config = Self::default();
        let unknown_keys = config.apply_overrides(&content)?;

        Ok(LoadedConfig {
            config,
            source: Some(path.to_path_buf()),
            unknown_keys,
        })
    }

    /// Apply `KEY=VALUE` overrides on top of the current values.
    ///
    /// Returns the keys that were not recognized.
    pub fn apply_overrides(&mut self, content: &str) -> Result<Vec<String>> {
        let mut unknown = Vec::new();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::config(format!(
                    "Line {}: expected KEY=VALUE, got '{}'",
                    index + 1,
                    line
                )));
            };

            let key = key.trim();
            let value = unquote(value.trim());

            if !self.set(key, value)? {
                unknown.push(key.to_string());
            }
        }

        Ok(unknown)
    }

    /// Set a single key. Returns `false` if the key is not recognized.
    fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            "EMAIL" => self.notify.email = non_empty(value),
            "ENABLE_EMAIL_NOTIFICATIONS" => self.notify.enabled = parse_bool(key, value)?,
            "MAIL_COMMAND" => self.notify.mail_command = value.to_string(),
            "HOSTS_FILE" => self.paths.hosts_file = PathBuf::from(value),
            "IP_CACHE_FILE" => self.paths.ip_cache_file = PathBuf::from(value),
            "LOG_FILE" => self.logging.file = non_empty(value).map(PathBuf::from),
            "IP_SERVICE" => self.ip_lookup.primary = value.to_string(),
            "FALLBACK_IP_SERVICES" => {
                self.ip_lookup.fallbacks = value.split_whitespace().map(str::to_string).collect()
            }
            "IP_LOOKUP_TIMEOUT" => self.ip_lookup.timeout_secs = parse_positive(key, value)?,
            "MAX_RETRIES" => {
                self.retry.max_retries = parse_positive(key, value)?
                    .try_into()
                    .map_err(|_| Error::config(format!("{} is out of range: {}", key, value)))?
            }
            "RETRY_DELAY" => {
                self.retry.retry_delay_secs = value.parse().map_err(|_| {
                    Error::config(format!("{} must be a number of seconds, got '{}'", key, value))
                })?
            }
            "LOG_LEVEL" => {
                self.logging.level = LogLevel::parse(value).ok_or_else(|| {
                    Error::config(format!(
                        "{} '{}' is not valid. Valid levels: DEBUG, INFO, WARN, ERROR",
                        key, value
                    ))
                })?
            }
            "JSON_LOGGING" => self.logging.json = parse_bool(key, value)?,
            "AWS_PROFILE" => self.aws.profile = non_empty(value),
            "AWS_REGION" => self.aws.region = non_empty(value),
            "DRY_RUN" => self.dry_run = parse_bool(key, value)?,
            "SKIP_IF_IP_UNCHANGED" => self.skip_if_ip_unchanged = parse_bool(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Recipient to notify, if notifications are enabled and addressed
    pub fn notification_recipient(&self) -> Option<&str> {
        if !self.notify.enabled {
            return None;
        }
        self.notify.email.as_deref()
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" | "" => Ok(false),
        _ => Err(Error::config(format!(
            "{} must be a boolean (true/false), got '{}'",
            key, value
        ))),
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::config(format!(
            "{} must be a positive integer, got '{}'",
            key, value
        ))),
    }
}
