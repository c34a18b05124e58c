// # HTTP Check-IP Resolver
//
// This crate provides the HTTP-based IP resolver for the dynup system.
//
// ## Architecture
//
// One GET against a check-ip page per `resolve()` call. The response body
// is text (often HTML) containing the caller's address somewhere inside;
// the first dotted-quad in the body is extracted and validated as an
// IPv4 address. A body without a well-formed address is a resolution
// failure, never a partial or garbage IP.
//
// ## Failure contract
//
// Network errors, timeouts, non-2xx statuses, and unextractable bodies
// all map to `Error::IpResolve`. The resolver never retries; the
// scheduler's poll interval is the retry cadence.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use dynup_core::traits::IpResolver;
use dynup_core::{Error, Result};

/// Default check-ip page
pub const DEFAULT_CHECKIP_URL: &str = "http://checkip.dy.fi/";

/// Request timeout, so a hung connection cannot stall the tick loop
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// First dotted-quad candidate in the body; octet range is checked by the
// Ipv4Addr parse afterwards
static IPV4_CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})").expect("pattern is valid")
});

/// Extract the first well-formed IPv4 address embedded in a text body
pub fn extract_ipv4(body: &str) -> Option<Ipv4Addr> {
    for candidate in IPV4_CANDIDATE.find_iter(body) {
        if let Ok(ip) = candidate.as_str().parse::<Ipv4Addr>() {
            return Some(ip);
        }
    }
    None
}

/// HTTP-based public IP resolver
pub struct HttpIpResolver {
    /// Check-ip page URL
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a resolver against `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for HttpIpResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CHECKIP_URL)
    }
}

#[async_trait::async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_resolve(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::ip_resolve(format!(
                "check-ip page returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_resolve(format!("failed to read response: {e}")))?;

        let ip = extract_ipv4(&body).ok_or_else(|| {
            Error::ip_resolve(format!("no IPv4 address found in check-ip page at {}", self.url))
        })?;

        debug!("check-ip page reports {ip}");
        Ok(IpAddr::V4(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn extracts_ip_from_html_body() {
        let body = "<html><body>Current IP Address: 84.231.10.2</body></html>";
        assert_eq!(extract_ipv4(body), Some(Ipv4Addr::new(84, 231, 10, 2)));
    }

    #[test]
    fn extracts_ip_from_plain_body() {
        assert_eq!(extract_ipv4("1.2.3.4\n"), Some(Ipv4Addr::new(1, 2, 3, 4)));
    }

    #[test]
    fn skips_out_of_range_candidates() {
        // 999.1.2.3 matches the shape but not the octet range; the next
        // candidate wins
        let body = "v999.1.2.3 then 10.0.0.1";
        assert_eq!(extract_ipv4(body), Some(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn body_without_address_yields_none() {
        assert_eq!(extract_ipv4("<html>no address here 1.2.3</html>"), None);
    }

    #[tokio::test]
    async fn resolves_from_check_ip_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("Current IP Address: 84.231.10.2"),
            )
            .mount(&server)
            .await;

        let resolver = HttpIpResolver::new(server.uri());
        let ip = resolver.resolve().await.unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(84, 231, 10, 2)));
    }

    #[tokio::test]
    async fn non_success_status_is_a_resolution_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let resolver = HttpIpResolver::new(server.uri());
        assert!(resolver.resolve().await.is_err());
    }

    #[tokio::test]
    async fn garbage_body_is_a_resolution_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let resolver = HttpIpResolver::new(server.uri());
        assert!(resolver.resolve().await.is_err());
    }

    #[tokio::test]
    async fn unreachable_server_is_a_resolution_failure() {
        // Nothing listens on this port
        let resolver = HttpIpResolver::new("http://127.0.0.1:9");
        assert!(resolver.resolve().await.is_err());
    }
}
