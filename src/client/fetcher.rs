//! Document fetching with bounded retry
//!
//! Only network-level failures are retried. A response with a status other
//! than 200 is final: statuses such as 404 are not transient on this API.

use crate::client::transport::HttpTransport;
use crate::config::{ClientConfig, DEFAULT_MAX_RETRIES};
use crate::error::{MeinEtaError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// How often and how fast a fetch is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    pub max_attempts: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            delay: Duration::ZERO,
        }
    }
}

impl From<&ClientConfig> for RetryPolicy {
    fn from(config: &ClientConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            delay: config.retry_delay,
        }
    }
}

/// Wraps a transport with retry and failure classification
pub struct ResilientFetcher<T: HttpTransport> {
    transport: Arc<T>,
    policy: RetryPolicy,
}

impl<T: HttpTransport> ResilientFetcher<T> {
    pub fn new(transport: Arc<T>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch the body of `url`
    ///
    /// Returns on the first 200 response. A non-200 status fails at once
    /// with [`MeinEtaError::InvalidResponse`]; network errors are retried
    /// and become [`MeinEtaError::Connection`] after the last attempt.
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(attempt, %url, "Fetching document");

            match self.transport.get(url).await {
                Ok(response) if response.is_ok() => return Ok(response.body),
                Ok(response) => {
                    warn!(attempt, status = response.status, %url, "Request failed with status");
                    return Err(MeinEtaError::invalid_response(response.status));
                }
                Err(e) => {
                    warn!(attempt, error = %e, %url, "Network error");
                    if attempt >= max_attempts {
                        return Err(MeinEtaError::retries_exhausted(url.as_str(), max_attempts, e));
                    }
                }
            }

            if !self.policy.delay.is_zero() {
                tokio::time::sleep(self.policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::{HttpResponse, TransportError};
    use crate::mock::MockTransport;
    use tokio_test::{assert_err, assert_ok};

    fn url() -> Url {
        "http://192.168.1.100:8080/user/menu".parse().unwrap()
    }

    fn refused() -> TransportError {
        TransportError::Connect("connection refused".to_string())
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let transport = Arc::new(MockTransport::new().respond(HttpResponse::new(200, "<eta/>")));
        let fetcher = ResilientFetcher::new(transport.clone(), RetryPolicy::default());

        assert_eq!(assert_ok!(fetcher.fetch(&url()).await), "<eta/>");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_two_network_failures() {
        let transport = Arc::new(
            MockTransport::new()
                .fail(refused())
                .fail(TransportError::Timeout("deadline elapsed".to_string()))
                .respond(HttpResponse::new(200, "<eta></eta>")),
        );
        let fetcher = ResilientFetcher::new(transport.clone(), RetryPolicy::default());

        assert_eq!(assert_ok!(fetcher.fetch(&url()).await), "<eta></eta>");
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_three_network_failures() {
        let transport = Arc::new(
            MockTransport::new()
                .fail(refused())
                .fail(refused())
                .fail(refused())
                .respond(HttpResponse::new(200, "never reached")),
        );
        let fetcher = ResilientFetcher::new(transport.clone(), RetryPolicy::default());

        let err = assert_err!(fetcher.fetch(&url()).await);
        assert!(matches!(err, MeinEtaError::Connection { status: None, .. }));
        assert!(err.message().contains("failed after 3 attempts"));
        assert!(err.message().contains("http://192.168.1.100:8080/user/menu"));
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_non_200_is_not_retried() {
        let transport = Arc::new(
            MockTransport::new()
                .respond(HttpResponse::new(500, "boom"))
                .respond(HttpResponse::new(200, "<eta/>")),
        );
        let fetcher = ResilientFetcher::new(transport.clone(), RetryPolicy::default());

        let err = assert_err!(fetcher.fetch(&url()).await);
        assert!(matches!(err, MeinEtaError::InvalidResponse { status: 500 }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_200_after_network_failure() {
        let transport = Arc::new(
            MockTransport::new()
                .fail(refused())
                .respond(HttpResponse::new(404, "")),
        );
        let fetcher = ResilientFetcher::new(transport.clone(), RetryPolicy::default());

        let err = assert_err!(fetcher.fetch(&url()).await);
        assert_eq!(err.error_code(), Some(404));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_attempts() {
        let transport = Arc::new(
            MockTransport::new()
                .fail(refused())
                .respond(HttpResponse::new(200, "ok")),
        );
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        };
        let fetcher = ResilientFetcher::new(transport.clone(), policy);

        let started = tokio::time::Instant::now();
        assert_eq!(assert_ok!(fetcher.fetch(&url()).await), "ok");
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[test]
    fn test_policy_from_config() {
        let config = ClientConfig::new("eta")
            .with_max_retries(0)
            .with_retry_delay(Duration::from_millis(50));
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay, Duration::from_millis(50));
    }
}
