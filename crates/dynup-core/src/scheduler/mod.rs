//! Scheduler loop
//!
//! The Scheduler drives repeated ticks against its collaborators:
//!
//! 1. Resolve the current public IP once per tick. All hosts in a tick are
//!    evaluated against this one observed IP; it is not re-resolved per
//!    host. A failed resolution skips the whole tick.
//! 2. For each configured host, sequentially: load state, run the decision
//!    policy, invoke the update client when due, and persist new state
//!    only when the provider accepted the update.
//! 3. Sleep the base poll interval and repeat forever.
//!
//! The poll interval is a high-frequency tick, much shorter than the
//! per-host refresh interval: IP-change reactions are fast while provider
//! calls stay rare. It is also the only retry cadence; a failed resolution
//! or update simply leaves the host due for the next tick.
//!
//! Hosts are processed one at a time, in configured order. This keeps
//! provider calls serialized and removes any need for locking around the
//! state store. Shutdown is honored at the inter-tick sleep, never inside
//! an in-flight tick.

use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::RunConfig;
use crate::decision::{RefreshPolicy, is_update_due};
use crate::error::Result;
use crate::jitter::{JitterSource, RandomJitter};
use crate::time::{SystemTimeSource, TimeSource};
use crate::traits::{IpResolver, StateStore, UpdateClient};

/// Events emitted by the Scheduler for external monitoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// Loop started
    Started {
        host_count: usize,
    },

    /// Public IP resolved at the start of a tick
    IpResolved {
        ip: IpAddr,
    },

    /// IP resolution failed; the whole tick was skipped
    IpResolutionFailed {
        error: String,
    },

    /// A host's update was judged due this tick
    UpdateDue {
        hostname: String,
        ip: IpAddr,
    },

    /// The provider accepted a host's update
    UpdateSucceeded {
        hostname: String,
        ip: IpAddr,
    },

    /// The provider call failed for a host; its state is unchanged
    UpdateFailed {
        hostname: String,
        status: Option<u16>,
        message: String,
    },

    /// A host needed no update this tick
    UpdateSkipped {
        hostname: String,
        ip: IpAddr,
    },

    /// Loop stopped
    Stopped {
        reason: String,
    },
}

/// The update-decision loop
///
/// ## Lifecycle
///
/// 1. Create with [`Scheduler::new()`]
/// 2. Start with [`Scheduler::run()`]; the loop runs until a shutdown
///    signal is received
///
/// For embedding and tests, [`Scheduler::tick()`] runs a single
/// resolve-and-evaluate pass, and the time and jitter sources can be
/// replaced with deterministic ones.
pub struct Scheduler {
    /// Resolver for the current public IP
    resolver: Box<dyn IpResolver>,

    /// Provider update client
    client: Box<dyn UpdateClient>,

    /// Durable per-hostname state
    store: Box<dyn StateStore>,

    /// Clock and sleep capability
    time: Box<dyn TimeSource>,

    /// Jitter draws for the decision policy
    jitter: Box<dyn JitterSource>,

    /// Hostnames in evaluation order
    hostnames: Vec<String>,

    /// Base poll interval between ticks
    poll_interval: Duration,

    /// Refresh thresholds for the decision policy
    policy: RefreshPolicy,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SchedulerEvent>,
}

impl Scheduler {
    /// Create a new scheduler
    ///
    /// Validates the configuration and wires the production time and
    /// jitter sources.
    ///
    /// # Returns
    ///
    /// A tuple of (scheduler, event_receiver) where the receiver yields
    /// [`SchedulerEvent`]s.
    pub fn new(
        resolver: Box<dyn IpResolver>,
        client: Box<dyn UpdateClient>,
        store: Box<dyn StateStore>,
        config: &RunConfig,
    ) -> Result<(Self, mpsc::Receiver<SchedulerEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let scheduler = Self {
            resolver,
            client,
            store,
            time: Box::new(SystemTimeSource),
            jitter: Box::new(RandomJitter::new()),
            hostnames: config.hostnames.clone(),
            poll_interval: config.poll_interval(),
            policy: config.refresh_policy(),
            event_tx: tx,
        };

        Ok((scheduler, rx))
    }

    /// Replace the time source (for tests and embedding)
    pub fn with_time_source(mut self, time: Box<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    /// Replace the jitter source (for tests and embedding)
    pub fn with_jitter_source(mut self, jitter: Box<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    /// Run the loop until a shutdown signal (SIGTERM or SIGINT) is
    /// received
    ///
    /// # Returns
    ///
    /// - `Ok(())`: clean shutdown
    pub async fn run(&mut self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the loop with a controlled shutdown signal
    ///
    /// Used by tests and embedders that manage shutdown themselves rather
    /// than through OS signals. The signal is honored at the inter-tick
    /// sleep, not inside an in-flight tick.
    pub async fn run_with_shutdown(
        &mut self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(
        &mut self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        info!(
            "starting update loop for: {}",
            self.hostnames.join(", ")
        );
        self.emit(SchedulerEvent::Started {
            host_count: self.hostnames.len(),
        });

        if let Some(mut rx) = shutdown_rx {
            // Controlled mode: external shutdown signal
            loop {
                self.tick().await;

                tokio::select! {
                    _ = self.time.sleep(self.poll_interval) => {}
                    _ = &mut rx => {
                        info!("shutdown signal received");
                        self.emit(SchedulerEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        } else {
            // Production mode: SIGTERM/SIGINT. The streams are registered
            // once, up front, so a signal delivered during an in-flight
            // tick is queued rather than lost
            let shutdown = shutdown_signal()?;
            tokio::pin!(shutdown);
            loop {
                self.tick().await;

                tokio::select! {
                    _ = self.time.sleep(self.poll_interval) => {}
                    name = &mut shutdown => {
                        info!("{name} received, shutting down");
                        self.emit(SchedulerEvent::Stopped {
                            reason: name.to_string(),
                        });
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Run a single tick: one IP resolution followed by evaluation of all
    /// configured hosts
    ///
    /// A tick never fails upward; every error is logged and recovered
    /// locally so the loop keeps running.
    pub async fn tick(&mut self) {
        let ip = match self.resolver.resolve().await {
            Ok(ip) => ip,
            Err(e) => {
                warn!("could not resolve current IP, skipping this tick: {e}");
                self.emit(SchedulerEvent::IpResolutionFailed {
                    error: e.to_string(),
                });
                return;
            }
        };
        debug!("current public IP is {ip}");
        self.emit(SchedulerEvent::IpResolved { ip });

        let now = self.time.now();
        let hostnames = self.hostnames.clone();
        for hostname in &hostnames {
            self.evaluate_host(hostname, ip, now).await;
        }
    }

    /// Evaluate one host against the tick's observed IP
    async fn evaluate_host(&mut self, hostname: &str, ip: IpAddr, now: DateTime<Utc>) {
        let state = match self.store.load(hostname).await {
            Ok(state) => state,
            Err(e) => {
                // Degrade exactly like a malformed record: no prior state
                warn!("[{hostname}] failed to load state, treating as no record: {e}");
                None
            }
        };

        let due = is_update_due(ip, state.as_ref(), now, &self.policy, self.jitter.as_mut());
        if !due {
            let age_hours = state
                .as_ref()
                .map(|r| r.age(now).num_hours())
                .unwrap_or_default();
            info!("[{hostname}] no update needed (IP {ip} unchanged, last update {age_hours}h ago)");
            self.emit(SchedulerEvent::UpdateSkipped {
                hostname: hostname.to_string(),
                ip,
            });
            return;
        }

        self.emit(SchedulerEvent::UpdateDue {
            hostname: hostname.to_string(),
            ip,
        });

        let outcome = self.client.update(hostname).await;
        if outcome.succeeded {
            info!(
                "[{hostname}] update accepted, status: {}, response: {}",
                outcome.status.unwrap_or_default(),
                outcome.message
            );
            if let Err(e) = self.store.save(hostname, ip).await {
                // State stays untouched: the host remains due and the save
                // is retried with the next successful update
                error!("[{hostname}] failed to persist state after update: {e}");
            }
            self.emit(SchedulerEvent::UpdateSucceeded {
                hostname: hostname.to_string(),
                ip,
            });
        } else {
            match outcome.status {
                Some(status) => warn!(
                    "[{hostname}] update rejected, status: {status}, response: {}",
                    outcome.message
                ),
                None => warn!("[{hostname}] update error: {}", outcome.message),
            }
            self.emit(SchedulerEvent::UpdateFailed {
                hostname: hostname.to_string(),
                status: outcome.status,
                message: outcome.message,
            });
        }
    }

    /// Emit a scheduler event
    fn emit(&self, event: SchedulerEvent) {
        // Monitoring must never stall the loop: drop the event (with a
        // warning) when the channel is full
        if self.event_tx.try_send(event).is_err() {
            warn!("event channel full, dropping scheduler event");
        }
    }
}

/// Register the process shutdown signals and return a future that
/// resolves with the name of the first one delivered
#[cfg(unix)]
fn shutdown_signal() -> Result<impl std::future::Future<Output = &'static str>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

/// Fallback for non-Unix platforms: CTRL-C only
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl std::future::Future<Output = &'static str>> {
    Ok(async {
        let _ = tokio::signal::ctrl_c().await;
        "SIGINT"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_events_are_comparable() {
        let event = SchedulerEvent::UpdateDue {
            hostname: "example.dy.fi".to_string(),
            ip: IpAddr::from([1, 1, 1, 1]),
        };
        assert_eq!(event.clone(), event);
    }
}
