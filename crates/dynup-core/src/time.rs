//! Time source capability
//!
//! The scheduler never reads the wall clock or sleeps directly; it goes
//! through this trait so tests can simulate many ticks without real
//! delays and with a controlled clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Clock and sleep capability for the scheduler
#[async_trait]
pub trait TimeSource: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Sleep for the given duration
    async fn sleep(&self, duration: Duration);
}

/// Production time source: real clock, real sleep
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

#[async_trait]
impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
