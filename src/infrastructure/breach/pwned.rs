//! Range-API client for the compromised-password corpus

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, Response, StatusCode};
use tracing::{debug, info, warn};

use crate::config::BreachCheckConfig;
use crate::domain::breach::{count_in_range, BreachChecker, HASH_PREFIX_LEN};
use crate::domain::DomainError;

const SERVICE: &str = "pwned-passwords";

/// Retries granted after a rate-limited response
const MAX_RATE_LIMIT_RETRIES: u32 = 1;

/// Client for `GET {base_url}/range/{prefix}`
#[derive(Debug, Clone)]
pub struct PwnedPasswordsClient {
    client: Client,
    base_url: String,
}

impl PwnedPasswordsClient {
    /// Build a client with the configured connect and read timeouts
    pub fn new(config: &BreachCheckConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_range(&self, prefix: &str) -> Result<Response, DomainError> {
        let url = format!("{}/range/{}", self.base_url, prefix);

        self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::external(SERVICE, format!("Request failed: {}", e)))
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[async_trait]
impl BreachChecker for PwnedPasswordsClient {
    async fn occurrences(&self, sha1_hash: &str) -> Result<u64, DomainError> {
        info!(hash = %sha1_hash, "Checking password hash");

        let Some(prefix) = sha1_hash.get(..HASH_PREFIX_LEN) else {
            return Ok(0);
        };

        let mut retries = 0;

        loop {
            let response = self.fetch_range(prefix).await?;

            match response.status() {
                status if status.is_success() => {
                    let body = response.text().await.map_err(|e| {
                        DomainError::external(SERVICE, format!("Failed to read response: {}", e))
                    })?;
                    return Ok(count_in_range(sha1_hash, prefix, &body));
                }
                StatusCode::NOT_FOUND => {
                    debug!(prefix = %prefix, "Range not found, password not compromised");
                    return Ok(0);
                }
                StatusCode::TOO_MANY_REQUESTS if retries < MAX_RATE_LIMIT_RETRIES => {
                    let Some(wait) = retry_after(&response) else {
                        warn!("Rate limited without a usable Retry-After header");
                        return Ok(0);
                    };

                    warn!(seconds = wait.as_secs(), "Rate limited, retrying once");
                    tokio::time::sleep(wait).await;
                    retries += 1;
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    warn!("Still rate limited after retry, reporting not compromised");
                    return Ok(0);
                }
                status => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(DomainError::external(
                        SERVICE,
                        format!("HTTP {}: {}", status, body),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HASH: &str = "5BAA61E4C9B93F3F0682250B6CF8331B7EE68FD8";

    fn client_for(server: &MockServer) -> PwnedPasswordsClient {
        PwnedPasswordsClient::new(&BreachCheckConfig {
            base_url: server.uri(),
            connect_timeout_ms: 1_000,
            read_timeout_ms: 5_000,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_matching_suffix_returns_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/range/5BAA6"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "0018A45C4D1DEF81644B54AB7F969B88D65:1\r\n1E4C9B93F3F0682250B6CF8331B7EE68FD8:3\r\n",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let count = client_for(&server).occurrences(HASH).await.unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_not_found_means_not_compromised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let count = client_for(&server).occurrences(HASH).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_rate_limited_then_success_retries_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("1E4C9B93F3F0682250B6CF8331B7EE68FD8:7"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let count = client_for(&server).occurrences(HASH).await.unwrap();
        assert_eq!(count, 7);
    }

    #[tokio::test]
    async fn test_rate_limited_twice_gives_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .expect(2)
            .mount(&server)
            .await;

        let count = client_for(&server).occurrences(HASH).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_rate_limited_without_header_does_not_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let count = client_for(&server).occurrences(HASH).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_server_error_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client_for(&server).occurrences(HASH).await;
        assert!(matches!(result, Err(DomainError::External { .. })));
    }

    #[tokio::test]
    async fn test_short_hash_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let count = client_for(&server).occurrences("5BA").await.unwrap();
        assert_eq!(count, 0);
    }
}
