// # dynup-core
//
// Core library for the dynup dynamic-DNS updater.
//
// ## Architecture Overview
//
// The crate is organized around one loop and its collaborators:
// - **IpResolver**: Trait for discovering the current public IP
// - **UpdateClient**: Trait for issuing the provider update call
// - **StateStore**: Trait for durable per-hostname update state
// - **decision**: Pure policy deciding whether a host's update is due
// - **Scheduler**: Drives repeated ticks: resolve once, evaluate every
//   configured host, update when due, persist on success, sleep
//
// ## Design Principles
//
// 1. **Separation of Concerns**: The decision policy is a pure function;
//    all I/O lives behind trait seams
// 2. **Sequential**: Hosts are evaluated one at a time within a tick, so
//    provider calls stay serialized and the state store needs no locking
// 3. **Injectable capabilities**: Clock, sleep, and jitter are trait
//    objects so tests can simulate many ticks deterministically
// 4. **Self-healing state**: Corrupt or missing state records degrade to
//    "no record", which makes the host due again

pub mod config;
pub mod decision;
pub mod error;
pub mod jitter;
pub mod scheduler;
pub mod state;
pub mod time;
pub mod traits;

// Re-export core types for convenience
pub use config::{Credentials, RunConfig};
pub use decision::{RefreshPolicy, is_update_due};
pub use error::{Error, Result};
pub use jitter::{FixedJitter, JitterSource, RandomJitter};
pub use scheduler::{Scheduler, SchedulerEvent};
pub use state::{FileStateStore, MemoryStateStore};
pub use time::{SystemTimeSource, TimeSource};
pub use traits::{HostRecord, IpResolver, StateStore, UpdateClient, UpdateOutcome};
