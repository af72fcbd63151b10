//! # Retry Policy
//!
//! Bounded exponential backoff for retryable collaborator errors.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::IndexerConfig;
use crate::domain::{IndexerError, SourceError};

/// Max shift applied to the base delay.
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// How often and how long to wait before re-issuing a failed fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Policy from the indexer configuration.
    pub fn from_config(config: &IndexerConfig) -> Self {
        Self {
            max_retries: config.max_fetch_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(MAX_BACKOFF_EXPONENT);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// retry budget is spent. `retries` is incremented per re-issue.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &str,
        retries: &mut u64,
        mut op: F,
    ) -> Result<T, IndexerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(IndexerError::Source(e)),
                Err(e) if attempt >= self.max_retries => {
                    return Err(IndexerError::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts: attempt + 1,
                        last_error: e,
                    });
                }
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "[indexer] {} failed ({}), retry {}/{} in {:?}",
                        operation,
                        e,
                        attempt + 1,
                        self.max_retries,
                        delay
                    );
                    attempt += 1;
                    *retries += 1;
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&IndexerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(12), Duration::from_secs(30));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_recovers_after_transient_errors() {
        let calls = Cell::new(0);
        let mut retries = 0;
        let result = fast_policy(3)
            .run("block 7", &mut retries, || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < 3 {
                        Err(SourceError::Transport("reset".into()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(retries, 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let mut retries = 0;
        let result: Result<(), _> = fast_policy(2)
            .run("block 7", &mut retries, || async {
                Err(SourceError::NotFound("tx".into()))
            })
            .await;

        assert!(matches!(
            result,
            Err(IndexerError::RetriesExhausted { attempts: 3, .. })
        ));
        assert_eq!(retries, 2);
    }

    #[tokio::test]
    async fn test_decode_error_not_retried() {
        let mut retries = 0;
        let result: Result<(), _> = fast_policy(5)
            .run("block 7", &mut retries, || async {
                Err(SourceError::Decode("bad json".into()))
            })
            .await;

        assert!(matches!(result, Err(IndexerError::Source(_))));
        assert_eq!(retries, 0);
    }
}
