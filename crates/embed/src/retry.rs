use expertsearch_common::{Result, SearchError};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry settings for provider calls
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles on each further attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Outcome of a single failed attempt
#[derive(Debug)]
pub(crate) enum AttemptError {
    /// Worth retrying (connect failure, timeout, 5xx, 429)
    Transient(String),

    /// Retrying cannot help (bad credentials, malformed response)
    Fatal(String),
}

impl AttemptError {
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = format!("HTTP error {}: {}", status, body);
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::Transient(message)
        } else {
            Self::Fatal(message)
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Transient(m) | Self::Fatal(m) => m,
        }
    }
}

/// Run `attempt` until it succeeds, fails fatally, or attempts run out
pub(crate) async fn with_retry<T, F, Fut>(
    provider: &str,
    policy: RetryPolicy,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, AttemptError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = String::from("no attempt made");

    for n in 1..=max_attempts {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(message)) => {
                return Err(SearchError::embedding_unavailable(format!(
                    "{}: {}",
                    provider, message
                )));
            }
            Err(err @ AttemptError::Transient(_)) => {
                last_error = err.message().to_string();
                if n < max_attempts {
                    let delay = policy.delay_for(n);
                    warn!(
                        "{} embedding request failed (attempt {}/{}): {}. Retrying in {:?}...",
                        provider, n, max_attempts, last_error, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(SearchError::embedding_unavailable(format!(
        "{}: all {} attempts failed, last error: {}",
        provider, max_attempts, last_error
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = &AtomicU32::new(0);
        let result = with_retry("test", fast_policy(3), || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AttemptError::Transient("connection reset".into()))
            } else {
                Ok(vec![1.0f32])
            }
        })
        .await;

        assert_eq!(result.unwrap(), vec![1.0]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fatal_error_stops_immediately() {
        let calls = &AtomicU32::new(0);
        let result: Result<()> = with_retry("test", fast_policy(3), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AttemptError::Fatal("HTTP error 401".into()))
        })
        .await;

        assert!(matches!(result, Err(SearchError::EmbeddingUnavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausted_attempts_report_last_error() {
        let result: Result<()> = with_retry("test", fast_policy(2), || async {
            Err(AttemptError::Transient("timed out".into()))
        })
        .await;

        match result {
            Err(SearchError::EmbeddingUnavailable(msg)) => assert!(msg.contains("timed out")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            AttemptError::from_status(reqwest::StatusCode::SERVICE_UNAVAILABLE, ""),
            AttemptError::Transient(_)
        ));
        assert!(matches!(
            AttemptError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, ""),
            AttemptError::Transient(_)
        ));
        assert!(matches!(
            AttemptError::from_status(reqwest::StatusCode::UNAUTHORIZED, ""),
            AttemptError::Fatal(_)
        ));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }
}
