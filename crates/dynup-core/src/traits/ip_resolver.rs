// # IP Resolver Trait
//
// Defines the interface for discovering the machine's externally visible
// IP address.
//
// ## Implementations
//
// - HTTP check-ip page: `dynup-ip-http` crate
//
// ## Contract
//
// A resolver returns the current public IP or a failure; it never returns
// a partial or garbage address. Network errors, timeouts, non-2xx
// responses, and unparseable bodies are all `Error::IpResolve`.
//
// Resolvers do NOT retry internally. Retry policy belongs to the
// scheduler: a failed tick is simply retried after the base poll interval.

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for public-IP resolver implementations
///
/// One resolution is shared across all hosts within a tick, so `resolve()`
/// is called at most once per tick.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Resolve the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: a syntactically well-formed address
    /// - `Err(Error)`: resolution failed; the caller skips this tick
    async fn resolve(&self) -> Result<IpAddr, crate::Error>;
}
