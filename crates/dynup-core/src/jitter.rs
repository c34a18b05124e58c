//! Jitter source capability
//!
//! The decision policy adds a bounded random perturbation to the refresh
//! threshold so that many hosts (or many updater instances sharing a
//! restart time) do not refresh against the provider in lockstep. The
//! randomness is injected as a capability so tests can pin the draw.

use rand::Rng;

/// Source of jitter offsets for the decision policy
///
/// A fresh value is drawn for every host evaluation, each tick.
pub trait JitterSource: Send {
    /// Draw an offset in seconds, uniform over `[-bound_secs, +bound_secs]`
    fn sample(&mut self, bound_secs: i64) -> i64;
}

/// Uniformly random jitter, the production source
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomJitter;

impl RandomJitter {
    pub fn new() -> Self {
        Self
    }
}

impl JitterSource for RandomJitter {
    fn sample(&mut self, bound_secs: i64) -> i64 {
        if bound_secs == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(-bound_secs..=bound_secs)
    }
}

/// Jitter source that always returns the same offset
///
/// For deterministic scheduling in tests: pinning the draw to `-bound` or
/// `+bound` exercises the extremes of the jittered threshold. The value is
/// clamped to the requested bound.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub i64);

impl JitterSource for FixedJitter {
    fn sample(&mut self, bound_secs: i64) -> i64 {
        self.0.clamp(-bound_secs, bound_secs)
    }
}
