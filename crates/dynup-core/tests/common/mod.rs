//! Test doubles and common utilities for scheduler contract tests
//!
//! These doubles record calls and play back scripted outcomes so tests can
//! assert exact call sequences against the scheduler's collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dynup_core::error::Result;
use dynup_core::traits::{HostRecord, IpResolver, StateStore, UpdateClient, UpdateOutcome};
use dynup_core::{Credentials, Error, RunConfig, TimeSource};

/// An IP resolver that plays back a scripted sequence of outcomes
///
/// Once the script is exhausted, the constructor's steady-state outcome
/// repeats.
#[derive(Clone)]
pub struct ScriptedResolver {
    script: Arc<Mutex<VecDeque<std::result::Result<IpAddr, String>>>>,
    last: Arc<Mutex<std::result::Result<IpAddr, String>>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedResolver {
    /// Resolver that always yields `ip`
    pub fn fixed(ip: IpAddr) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            last: Arc::new(Mutex::new(Ok(ip))),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Resolver that always fails (simulated timeout)
    pub fn failing(reason: &str) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            last: Arc::new(Mutex::new(Err(reason.to_string()))),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue an outcome ahead of the steady-state one
    pub fn push(&self, outcome: std::result::Result<IpAddr, String>) {
        self.script.lock().unwrap().push_back(outcome);
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IpResolver for ScriptedResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        let outcome = match next {
            Some(outcome) => outcome,
            None => self.last.lock().unwrap().clone(),
        };
        outcome.map_err(Error::ip_resolve)
    }
}

/// An update client that records calls and plays back scripted outcomes
#[derive(Clone)]
pub struct MockUpdateClient {
    script: Arc<Mutex<VecDeque<UpdateOutcome>>>,
    default_outcome: Arc<Mutex<UpdateOutcome>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockUpdateClient {
    /// Client whose provider always accepts
    pub fn accepting() -> Self {
        Self::with_default(UpdateOutcome::from_status(200, "good"))
    }

    /// Client whose provider always rejects
    pub fn rejecting(status: u16, message: &str) -> Self {
        Self::with_default(UpdateOutcome::from_status(status, message))
    }

    fn with_default(outcome: UpdateOutcome) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            default_outcome: Arc::new(Mutex::new(outcome)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue an outcome ahead of the default one
    pub fn push(&self, outcome: UpdateOutcome) {
        self.script.lock().unwrap().push_back(outcome);
    }

    /// Hostnames passed to `update()`, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl UpdateClient for MockUpdateClient {
    async fn update(&self, hostname: &str) -> UpdateOutcome {
        self.calls.lock().unwrap().push(hostname.to_string());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.default_outcome.lock().unwrap().clone())
    }
}

/// A state store that records saves and can be pre-seeded
#[derive(Clone, Default)]
pub struct MockStateStore {
    records: Arc<Mutex<HashMap<String, HostRecord>>>,
    save_count: Arc<AtomicUsize>,
    load_count: Arc<AtomicUsize>,
}

impl MockStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a record as if a prior update succeeded at `updated_at`
    pub fn seed(&self, hostname: &str, ip: IpAddr, updated_at: DateTime<Utc>) {
        self.records
            .lock()
            .unwrap()
            .insert(hostname.to_string(), HostRecord { ip, updated_at });
    }

    pub fn record(&self, hostname: &str) -> Option<HostRecord> {
        self.records.lock().unwrap().get(hostname).cloned()
    }

    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MockStateStore {
    async fn load(&self, hostname: &str) -> Result<Option<HostRecord>> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().unwrap().get(hostname).cloned())
    }

    async fn save(&self, hostname: &str, ip: IpAddr) -> Result<()> {
        self.save_count.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .insert(hostname.to_string(), HostRecord::new(ip));
        Ok(())
    }
}

/// A manual time source: the clock only moves when a sleep advances it,
/// and a simulated sleep takes a few real milliseconds regardless of the
/// requested duration
#[derive(Clone)]
pub struct ManualTimeSource {
    now: Arc<Mutex<DateTime<Utc>>>,
    sleep_count: Arc<AtomicUsize>,
}

impl ManualTimeSource {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
            sleep_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn sleep_count(&self) -> usize {
        self.sleep_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleep_count.fetch_add(1, Ordering::SeqCst);
        {
            let mut now = self.now.lock().unwrap();
            *now += chrono::Duration::from_std(duration).unwrap_or_default();
        }
        // A short real delay keeps tick counts bounded and lets a
        // concurrently sent shutdown signal win the select
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// A minimal valid RunConfig for the given hosts
pub fn test_config(hosts: &[&str]) -> RunConfig {
    RunConfig::new(
        Credentials::new("user", "secret"),
        hosts.iter().map(|h| h.to_string()).collect(),
    )
}
