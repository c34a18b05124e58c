//! Configuration types for the dynup system
//!
//! This module defines the immutable run configuration shared by the
//! scheduler and the decision policy. All thresholds are explicit fields
//! (not process-wide constants) so unit tests can use arbitrary values.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::decision::RefreshPolicy;

/// Provider account credentials
///
/// The `Debug` impl masks the password so credentials can be logged
/// alongside the rest of the configuration without leaking secrets.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Account username
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create a new credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Immutable configuration for one updater process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Provider credentials
    pub credentials: Credentials,

    /// Hostnames to keep updated, in evaluation order
    pub hostnames: Vec<String>,

    /// Base poll interval between ticks, in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Target maximum age of a record before a refresh update, in seconds
    ///
    /// Guards against provider-side record expiry (e.g. a 7-day TTL) even
    /// when the IP never changes. Default: 6 days.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Bound of the random perturbation added to the refresh interval, in
    /// seconds
    ///
    /// A fresh jitter in `[-bound, +bound]` is drawn for every host
    /// evaluation, so many hosts sharing a restart time do not hit the
    /// provider in lockstep. Default: 1 hour.
    #[serde(default = "default_jitter_bound_secs")]
    pub jitter_bound_secs: u64,

    /// Capacity of the scheduler's event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl RunConfig {
    /// Create a configuration with default intervals
    pub fn new(credentials: Credentials, hostnames: Vec<String>) -> Self {
        Self {
            credentials,
            hostnames,
            poll_interval_secs: default_poll_interval_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            jitter_bound_secs: default_jitter_bound_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Validate the configuration
    ///
    /// Missing credentials, an empty or duplicated hostname list, a
    /// malformed hostname, a zero poll interval, or a jitter bound larger
    /// than the refresh interval are all startup-fatal.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.credentials.username.is_empty() {
            return Err(crate::Error::config("username is required"));
        }
        if self.credentials.password.is_empty() {
            return Err(crate::Error::config("password is required"));
        }
        if self.hostnames.is_empty() {
            return Err(crate::Error::config("at least one hostname is required"));
        }

        let mut seen = HashSet::new();
        for hostname in &self.hostnames {
            validate_hostname(hostname)?;
            if !seen.insert(hostname.as_str()) {
                return Err(crate::Error::config(format!(
                    "duplicate hostname: {hostname}"
                )));
            }
        }

        if self.poll_interval_secs == 0 {
            return Err(crate::Error::config("poll interval must be > 0"));
        }
        if self.jitter_bound_secs > self.refresh_interval_secs {
            return Err(crate::Error::config(format!(
                "jitter bound ({}s) must not exceed refresh interval ({}s)",
                self.jitter_bound_secs, self.refresh_interval_secs
            )));
        }

        Ok(())
    }

    /// Base poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Refresh policy derived from the configured intervals
    pub fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            refresh_interval: chrono::Duration::seconds(self.refresh_interval_secs as i64),
            jitter_bound: chrono::Duration::seconds(self.jitter_bound_secs as i64),
        }
    }
}

/// Validate that a string is a plausible DNS hostname
///
/// This implements basic label validation per RFC 1035. It is not
/// comprehensive but catches common configuration mistakes (empty labels
/// from a stray comma, whitespace, overlong names).
fn validate_hostname(hostname: &str) -> Result<(), crate::Error> {
    if hostname.is_empty() {
        return Err(crate::Error::config("hostname cannot be empty"));
    }

    if hostname.len() > 253 {
        return Err(crate::Error::config(format!(
            "hostname too long: {} chars (max 253): {hostname}",
            hostname.len()
        )));
    }

    for label in hostname.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "hostname has an empty label: '{hostname}'"
            )));
        }
        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "hostname label too long: {} chars (max 63): '{label}'",
                label.len()
            )));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "hostname label contains invalid characters: '{label}'"
            )));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "hostname label cannot start or end with a hyphen: '{label}'"
            )));
        }
    }

    Ok(())
}

fn default_poll_interval_secs() -> u64 {
    600
}

fn default_refresh_interval_secs() -> u64 {
    // 6 days: refresh before a 7-day provider-side expiry
    6 * 24 * 60 * 60
}

fn default_jitter_bound_secs() -> u64 {
    3600
}

fn default_event_channel_capacity() -> usize {
    256
}
