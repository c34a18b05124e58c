//! Core traits for the dynup system
//!
//! This module defines the abstract interfaces of the scheduler's external
//! collaborators.
//!
//! - [`IpResolver`]: Discover the current public IP
//! - [`UpdateClient`]: Issue the provider update call
//! - [`StateStore`]: Durable per-hostname update state

pub mod ip_resolver;
pub mod state_store;
pub mod update_client;

pub use ip_resolver::IpResolver;
pub use state_store::{HostRecord, StateStore};
pub use update_client::{UpdateClient, UpdateOutcome};
