// # State Store Trait
//
// Defines the interface for durable per-hostname update state.
//
// ## Purpose
//
// The state store remembers, per hostname, the last IP the provider was
// told about and when. The decision policy compares the current IP and
// record age against this to decide whether an update is due.
//
// ## Degradation
//
// A missing record and a malformed record are the same thing to callers:
// `load()` yields `None`. Treating corruption as "no record" is safe and
// self-healing, because the affected host becomes due and the next
// successful update rewrites the record.
//
// ## Implementations
//
// - File-based: one small text record per hostname
// - In-memory: for tests and deployments where persistence is not needed

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::net::IpAddr;

/// Durable record of a host's last successful update
///
/// The IP and timestamp are written together as one unit; a record never
/// exists with only one of them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HostRecord {
    /// The IP the provider was last told about
    pub ip: IpAddr,
    /// When that update succeeded
    pub updated_at: DateTime<Utc>,
}

impl HostRecord {
    /// Create a record stamped with the current time
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            updated_at: Utc::now(),
        }
    }

    /// Age of this record relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.updated_at)
    }
}

/// Trait for state store implementations
///
/// One record per hostname; no cross-host interference. The scheduler is
/// the only writer, and it writes only after a successful provider update.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the record for a hostname
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))`: a prior successful update exists
    /// - `Ok(None)`: no record, or the stored record was malformed
    /// - `Err(Error)`: storage error
    async fn load(&self, hostname: &str) -> Result<Option<HostRecord>, crate::Error>;

    /// Save `(ip, now)` for a hostname as a single durable unit
    ///
    /// Fully overwrites any prior record for that hostname and creates the
    /// containing directory if needed.
    async fn save(&self, hostname: &str, ip: IpAddr) -> Result<(), crate::Error>;
}
