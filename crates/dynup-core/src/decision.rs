//! Update decision policy
//!
//! Pure policy with no side effects: given the current IP, a host's
//! stored record, and the current time, decide whether an update is due.
//!
//! A host is due when:
//! 1. The current IP differs from the recorded one (or there is no
//!    record) — due unconditionally, regardless of age; or
//! 2. The record's age exceeds `refresh_interval + jitter`, where the
//!    jitter is drawn fresh from `[-jitter_bound, +jitter_bound]` for
//!    every evaluation.
//!
//! Updating strictly on IP change keeps records accurate with minimal
//! provider calls; the periodic refresh guards against provider-side
//! record expiry even when the IP never changes.

use chrono::{DateTime, Utc};
use std::net::IpAddr;

use crate::jitter::JitterSource;
use crate::traits::HostRecord;

/// Thresholds for the periodic-refresh half of the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Target maximum record age before a refresh update
    pub refresh_interval: chrono::Duration,
    /// Bound of the per-evaluation random perturbation
    pub jitter_bound: chrono::Duration,
}

impl RefreshPolicy {
    pub fn new(refresh_interval: chrono::Duration, jitter_bound: chrono::Duration) -> Self {
        Self {
            refresh_interval,
            jitter_bound,
        }
    }
}

/// Decide whether a host's update is due this tick
///
/// `state` is the host's stored record, `None` when no prior successful
/// update exists (or the record was unreadable). A fresh jitter offset is
/// drawn from `jitter` on every call.
pub fn is_update_due(
    current_ip: IpAddr,
    state: Option<&HostRecord>,
    now: DateTime<Utc>,
    policy: &RefreshPolicy,
    jitter: &mut dyn JitterSource,
) -> bool {
    let Some(record) = state else {
        // No prior record: infinitely stale, always due
        return true;
    };

    if current_ip != record.ip {
        return true;
    }

    let offset = jitter.sample(policy.jitter_bound.num_seconds());
    let threshold = policy.refresh_interval + chrono::Duration::seconds(offset);
    record.age(now) > threshold
}
