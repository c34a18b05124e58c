// # Update Client Trait
//
// Defines the interface for the provider update call.
//
// ## Implementations
//
// - dy.fi-style authenticated GET: `dynup-provider-dyfi` crate
//
// ## Contract
//
// The update call must never raise upward as a fatal error: transport
// failures, timeouts, and non-success statuses are all reported in-band
// via [`UpdateOutcome`]. The scheduler leaves state untouched on a failed
// outcome so the host stays due and is retried next tick.
//
// Clients hold their credentials; one invocation performs exactly one
// provider call. Retry, scheduling, and state decisions are owned by the
// scheduler.

use async_trait::async_trait;

/// In-band result of one provider update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Whether the provider signaled acceptance
    pub succeeded: bool,
    /// HTTP status reported by the provider, when a response was received
    pub status: Option<u16>,
    /// Provider response body (trimmed) or transport error text
    pub message: String,
}

impl UpdateOutcome {
    /// Outcome for a response received from the provider
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            succeeded: status == 200,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Outcome for a transport-level failure (no response received)
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            status: None,
            message: message.into(),
        }
    }
}

/// Trait for provider update client implementations
#[async_trait]
pub trait UpdateClient: Send + Sync {
    /// Perform the provider update call for one hostname
    ///
    /// Success means the provider accepted the update (its success status
    /// code). Failures are reported in the outcome, never as a panic or a
    /// propagated error.
    async fn update(&self, hostname: &str) -> UpdateOutcome;
}
