// # File State Store
//
// File-based implementation of StateStore: one small text record per
// hostname under a state directory.
//
// ## File Format
//
// `<state_dir>/<encoded-hostname>.state` containing `"<ip>,<unix-ts>"`,
// e.g. `example_dy_fi.state` with `1.2.3.4,1717243200`. The encoding
// replaces every character that is not alphanumeric or `-` with `_`, so
// records for different hostnames never collide on the filesystem in
// practice and never interfere with each other.
//
// The format is an internal detail, not a cross-process contract.
//
// ## Crash Recovery
//
// Writes go to a temporary file first and are renamed into place, so a
// reader never observes a half-written record as a stale-but-valid pair.
// If a crash corrupts a record anyway, `load()` degrades it to "no
// record": the host becomes due and the next successful update rewrites
// the file.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::Error;
use crate::traits::state_store::{HostRecord, StateStore};

/// File-based state store, one record per hostname
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    /// Create a store rooted at `dir`
    ///
    /// The directory itself is created lazily on the first save.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the record file for a hostname
    fn record_path(&self, hostname: &str) -> PathBuf {
        let encoded: String = hostname
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{encoded}.state"))
    }

    /// Parse a record file's content, returning `None` for anything
    /// malformed (wrong field count, bad IP, non-numeric timestamp)
    fn parse_record(content: &str) -> Option<HostRecord> {
        let (ip_text, ts_text) = content.trim().split_once(',')?;
        let ip: IpAddr = ip_text.parse().ok()?;
        let ts: i64 = ts_text.parse().ok()?;
        let updated_at = Utc.timestamp_opt(ts, 0).single()?;
        Some(HostRecord { ip, updated_at })
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, hostname: &str) -> Result<Option<HostRecord>, Error> {
        let path = self.record_path(hostname);

        // Missing, unreadable, and malformed records are all "no record":
        // the safe outcome (host becomes due) and self-healing on the next
        // successful save.
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                debug!("no readable state for {hostname} at {}: {e}", path.display());
                return Ok(None);
            }
        };

        match Self::parse_record(&content) {
            Some(record) => Ok(Some(record)),
            None => {
                debug!(
                    "malformed state for {hostname} at {}, treating as no record",
                    path.display()
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, hostname: &str, ip: IpAddr) -> Result<(), Error> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::state_store(format!(
                "failed to create state directory {}: {e}",
                self.dir.display()
            ))
        })?;

        let path = self.record_path(hostname);
        let temp_path = path.with_extension("tmp");
        let content = format!("{ip},{}", Utc::now().timestamp());

        fs::write(&temp_path, content.as_bytes()).await.map_err(|e| {
            Error::state_store(format!(
                "failed to write temp state file {}: {e}",
                temp_path.display()
            ))
        })?;

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &path).await.map_err(|e| {
            Error::state_store(format!(
                "failed to rename {} to {}: {e}",
                temp_path.display(),
                path.display()
            ))
        })?;

        debug!("state for {hostname} written to {}", path.display());
        Ok(())
    }
}
