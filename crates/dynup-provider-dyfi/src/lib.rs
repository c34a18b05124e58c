// # dy.fi Update Client
//
// This crate provides the dy.fi-style update client for the dynup system.
//
// ## Protocol
//
// One HTTP GET per update: `<endpoint>?hostname=<host>` with HTTP Basic
// credentials in the Authorization header. The provider signals
// acceptance with status 200; the body carries a short status word
// ("good <ip>", "nochg", "badauth", ...) that is surfaced verbatim in the
// outcome message for logging.
//
// ## Boundaries
//
// The client is single-shot and stateless: no retry, no backoff, no
// caching, no scheduling decisions. Those are owned by the scheduler.
// Failures never raise upward; transport errors and non-success statuses
// are reported in-band via `UpdateOutcome`.

use std::time::Duration;

use tracing::debug;

use dynup_core::Credentials;
use dynup_core::traits::{UpdateClient, UpdateOutcome};

/// Default dy.fi update endpoint
pub const DEFAULT_UPDATE_URL: &str = "https://www.dy.fi/nic/update";

/// Request timeout for the update call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// dy.fi-style authenticated update client
pub struct DyfiUpdateClient {
    /// Update endpoint URL
    endpoint: String,

    /// Account credentials, sent as HTTP Basic auth
    credentials: Credentials,

    /// HTTP client
    client: reqwest::Client,
}

impl DyfiUpdateClient {
    /// Create a client against the default dy.fi endpoint
    pub fn new(credentials: Credentials) -> Self {
        Self::with_endpoint(credentials, DEFAULT_UPDATE_URL)
    }

    /// Create a client against a custom endpoint
    pub fn with_endpoint(credentials: Credentials, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials,
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait::async_trait]
impl UpdateClient for DyfiUpdateClient {
    async fn update(&self, hostname: &str) -> UpdateOutcome {
        debug!("[{hostname}] sending update to {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("hostname", hostname)])
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status().as_u16();
                // A body read failure still carries the status signal
                let body = response.text().await.unwrap_or_default();
                UpdateOutcome::from_status(status, body.trim())
            }
            Err(e) => UpdateOutcome::transport_failure(e.to_string()),
        }
    }
}
