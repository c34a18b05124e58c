// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Purpose
//
// A fast state store that does not persist across restarts. Useful for
// tests and for container deployments where an extra update after a
// restart is harmless.
//
// ## Crash Behavior
//
// All state is lost on restart, so every host is due on the first tick
// afterwards. That is the safe direction: one redundant provider call,
// never a missed one.

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{HostRecord, StateStore};

/// In-memory state store implementation
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<HashMap<String, HostRecord>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, hostname: &str) -> Result<Option<HostRecord>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(hostname).cloned())
    }

    async fn save(&self, hostname: &str, ip: IpAddr) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(hostname.to_string(), HostRecord::new(ip));
        Ok(())
    }
}
