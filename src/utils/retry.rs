//! Retry utilities with exponential backoff for resilient API calls.

use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::serper::SerperError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum total time to spend on retries (including delays)
    pub max_total_time: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            max_total_time: Duration::from_secs(60),
        }
    }
}

/// Transient errors that should trigger a retry
#[derive(Debug, Clone, PartialEq)]
pub enum TransientError {
    /// Network connectivity issues
    Network,
    /// Too many requests (429)
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Service unavailable (503)
    ServiceUnavailable,
    /// Gateway timeout (504)
    GatewayTimeout,
    /// Request timeout
    Timeout,
}

impl TransientError {
    /// Check if a SerperError represents a transient error
    pub fn from_serper_error(err: &SerperError) -> Option<Self> {
        match err {
            SerperError::RateLimit => Some(TransientError::RateLimit),
            SerperError::Network(msg) => {
                if msg.to_lowercase().contains("timed out") {
                    Some(TransientError::Timeout)
                } else {
                    Some(TransientError::Network)
                }
            }
            SerperError::Api { status, .. } => match *status {
                503 => Some(TransientError::ServiceUnavailable),
                504 => Some(TransientError::GatewayTimeout),
                500..=599 => Some(TransientError::ServerError),
                _ => None,
            },
            _ => None,
        }
    }

    /// Get the recommended delay for this error
    pub fn recommended_delay(&self) -> Duration {
        match self {
            TransientError::RateLimit => Duration::from_secs(5),
            TransientError::ServiceUnavailable => Duration::from_secs(5),
            TransientError::GatewayTimeout => Duration::from_secs(3),
            TransientError::Timeout => Duration::from_secs(2),
            TransientError::Network => Duration::from_secs(2),
            TransientError::ServerError => Duration::from_secs(2),
        }
    }
}

/// Execute an async operation with retry logic.
///
/// Permanent errors are returned immediately; transient errors are retried
/// with exponential backoff until `max_attempts` or `max_total_time` is hit.
/// The total-time budget spans all attempts and delays: each attempt runs
/// under the remaining budget, and a delay that would overrun it ends the
/// retry loop instead.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, operation: F) -> Result<T, SerperError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, SerperError>>,
{
    let mut attempts = 0;
    let start = std::time::Instant::now();
    let mut operation = operation;

    loop {
        attempts += 1;

        let remaining = config.max_total_time.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            return Err(SerperError::Network("Operation timed out".to_string()));
        }

        match timeout(remaining, operation()).await {
            Ok(Ok(result)) => {
                if attempts > 1 {
                    tracing::info!(
                        "Operation succeeded on attempt {} after {} transient failures",
                        attempts,
                        attempts - 1
                    );
                }
                return Ok(result);
            }
            Ok(Err(error)) => {
                if let Some(transient) = TransientError::from_serper_error(&error) {
                    let delay = if attempts == 1 {
                        config.initial_delay
                    } else {
                        let exp_delay = config.initial_delay.as_secs_f64()
                            * config.backoff_multiplier.powf(attempts as f64 - 1.0);
                        Duration::from_secs_f64(exp_delay.min(config.max_delay.as_secs_f64()))
                    };

                    let delay = std::cmp::max(delay, transient.recommended_delay());

                    if attempts >= config.max_attempts
                        || start.elapsed() + delay >= config.max_total_time
                    {
                        tracing::warn!(
                            "Operation failed after {} attempts (elapsed: {:?}): {}",
                            attempts,
                            start.elapsed(),
                            error
                        );
                        return Err(error);
                    }

                    tracing::debug!(
                        "Transient error on attempt {}: {:?}, retrying in {:?}",
                        attempts,
                        transient,
                        delay
                    );

                    sleep(delay).await;
                } else {
                    return Err(error);
                }
            }
            Err(_) => {
                // The attempt ran out the remaining budget; retrying cannot fit.
                tracing::warn!("Operation timed out after {} attempts", attempts);
                return Err(SerperError::Network("Operation timed out".to_string()));
            }
        }
    }
}

/// Create a retry configuration suited to interactive tool calls.
///
/// Kept short: a client waiting on a tool result should not sit behind
/// minutes of backoff.
pub fn api_retry_config() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        initial_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(10),
        backoff_multiplier: 2.0,
        max_total_time: Duration::from_secs(45),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[tokio::test]
    async fn test_retry_success_first_try() {
        let config = RetryConfig::default();
        let call_count = Rc::new(RefCell::new(0));

        let result = {
            let call_count = call_count.clone();
            with_retry(config, move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Ok("success")
                }
            })
        }
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(*call_count.borrow(), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let config = RetryConfig {
            max_attempts: 4,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_total_time: Duration::from_secs(10),
        };
        let call_count = Rc::new(RefCell::new(0));

        let result = {
            let call_count = call_count.clone();
            with_retry(config, move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    let count = *call_count.borrow();
                    if count < 3 {
                        Err(SerperError::Network("temporary error".to_string()))
                    } else {
                        Ok("success")
                    }
                }
            })
        }
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(*call_count.borrow(), 3);
    }

    #[tokio::test]
    async fn test_retry_returns_permanent_error() {
        let config = RetryConfig {
            max_attempts: 5,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            backoff_multiplier: 2.0,
            max_total_time: Duration::from_secs(5),
        };
        let call_count = Rc::new(RefCell::new(0));

        let result: Result<&str, SerperError> = {
            let call_count = call_count.clone();
            with_retry(config, move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Err(SerperError::InvalidRequest("bad input".to_string()))
                }
            })
        }
        .await;

        assert!(matches!(result, Err(SerperError::InvalidRequest(_))));
        // Permanent errors must not be retried
        assert_eq!(*call_count.borrow(), 1);
    }

    #[tokio::test]
    async fn test_total_time_budget_spans_attempts() {
        // A hanging operation must consume the budget exactly once, not once
        // per attempt.
        let config = RetryConfig {
            max_attempts: 5,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            backoff_multiplier: 2.0,
            max_total_time: Duration::from_millis(150),
        };

        let started = std::time::Instant::now();
        let result: Result<&str, SerperError> = with_retry(config, || async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("unreachable")
        })
        .await;

        assert!(matches!(result, Err(SerperError::Network(_))));
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "budget applied per attempt instead of overall: {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn test_delay_overrunning_budget_stops_retries() {
        // Network errors recommend a 2s delay; with a 100ms budget the first
        // failure must be final.
        let config = RetryConfig {
            max_attempts: 10,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            backoff_multiplier: 2.0,
            max_total_time: Duration::from_millis(100),
        };
        let call_count = Rc::new(RefCell::new(0));

        let started = std::time::Instant::now();
        let result: Result<&str, SerperError> = {
            let call_count = call_count.clone();
            with_retry(config, move || {
                let call_count = call_count.clone();
                async move {
                    *call_count.borrow_mut() += 1;
                    Err(SerperError::Network("connection reset".to_string()))
                }
            })
        }
        .await;

        assert!(result.is_err());
        assert_eq!(*call_count.borrow(), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_transient_error_detection() {
        assert!(TransientError::from_serper_error(&SerperError::RateLimit).is_some());
        assert!(TransientError::from_serper_error(&SerperError::Network(
            "connection refused".to_string()
        ))
        .is_some());
        assert_eq!(
            TransientError::from_serper_error(&SerperError::Api {
                status: 503,
                body: String::new()
            }),
            Some(TransientError::ServiceUnavailable)
        );
        assert!(TransientError::from_serper_error(&SerperError::Api {
            status: 403,
            body: String::new()
        })
        .is_none());
        assert!(
            TransientError::from_serper_error(&SerperError::Parse("invalid json".to_string()))
                .is_none()
        );
    }

    #[test]
    fn test_recommended_delay() {
        assert_eq!(
            TransientError::RateLimit.recommended_delay(),
            Duration::from_secs(5)
        );
        assert_eq!(
            TransientError::Network.recommended_delay(),
            Duration::from_secs(2)
        );
    }
}
