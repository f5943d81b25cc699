// # File IP Cache
//
// File-based implementation of IpCache.
//
// ## File Format
//
// A single line holding the dotted-quad observed by the last run:
//
// ```text
// 203.0.113.7
// ```
//
// ## Writes
//
// The new value is written to `<path>.tmp` and renamed over the cache file,
// so a crash mid-write leaves either the old or the new value. The temp file
// is removed if the rename fails.

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::ip::parse_ipv4;
use crate::traits::ip_cache::IpCache;

/// File-based IP cache
///
/// # Example
///
/// ```rust,no_run
/// use r53_ddns_core::state::FileIpCache;
/// use r53_ddns_core::traits::IpCache;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let cache = FileIpCache::new("/var/lib/route53-ddns/last_ip");
///
///     cache.store("203.0.113.7".parse()?).await?;
///     assert_eq!(cache.load().await?, Some("203.0.113.7".parse()?));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileIpCache {
    path: PathBuf,
}

impl FileIpCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }

    async fn write_temp(&self, temp_path: &Path, ip: Ipv4Addr) -> Result<(), Error> {
        let mut file = fs::File::create(temp_path).await.map_err(|e| {
            Error::cache(format!(
                "Failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.write_all(format!("{}\n", ip).as_bytes())
            .await
            .map_err(|e| {
                Error::cache(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

        file.flush().await.map_err(|e| {
            Error::cache(format!(
                "Failed to flush temp file {}: {}",
                temp_path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl IpCache for FileIpCache {
    async fn load(&self) -> Result<Option<Ipv4Addr>, Error> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("IP cache does not exist: {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::cache(format!(
                    "Failed to read IP cache {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let value = content.trim();
        if value.is_empty() {
            return Ok(None);
        }

        match parse_ipv4(value) {
            Some(ip) => Ok(Some(ip)),
            None => {
                tracing::warn!(
                    "Ignoring unreadable IP cache {} (content: '{}')",
                    self.path.display(),
                    value
                );
                Ok(None)
            }
        }
    }

    async fn store(&self, ip: Ipv4Addr) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::cache(format!(
                        "Failed to create cache directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let temp_path = self.temp_path();
        let written = match self.write_temp(&temp_path, ip).await {
            Ok(()) => fs::rename(&temp_path, &self.path).await.map_err(|e| {
                Error::cache(format!(
                    "Failed to rename {} to {}: {}",
                    temp_path.display(),
                    self.path.display(),
                    e
                ))
            }),
            Err(e) => Err(e),
        };

        if written.is_err() {
            let _ = fs::remove_file(&temp_path).await;
        }
        written?;

        tracing::trace!("IP cache written: {}", self.path.display());
        Ok(())
    }
}
