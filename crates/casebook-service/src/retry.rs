//! Compare-and-swap retry loop

use crate::{RetryConfig, ServiceError};
use casebook_store::StoreError;
use std::future::Future;
use tracing::warn;

/// Why a single attempt failed
pub(crate) enum Attempt {
    /// Lost a revision race; re-read and try again
    Retry(String),
    /// Anything else; give up immediately
    Fail(ServiceError),
}

impl From<StoreError> for Attempt {
    fn from(err: StoreError) -> Self {
        if err.is_conflict() {
            Attempt::Retry(err.to_string())
        } else {
            Attempt::Fail(err.into())
        }
    }
}

impl From<ServiceError> for Attempt {
    fn from(err: ServiceError) -> Self {
        Attempt::Fail(err)
    }
}

/// Run `op` until it succeeds, fails hard, or the attempt budget runs out
pub(crate) async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    what: &str,
    mut op: F,
) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Attempt>>,
{
    let attempts = config.attempts();
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(Attempt::Fail(err)) => return Err(err),
            Err(Attempt::Retry(reason)) if attempt >= attempts => {
                return Err(ServiceError::CannotPerformOperation(format!(
                    "{what}: gave up after {attempt} attempts: {reason}"
                )));
            }
            Err(Attempt::Retry(reason)) => {
                let delay = config.backoff(attempt);
                warn!(what, attempt, ?delay, %reason, "concurrent modification, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn conflict() -> Attempt {
        Attempt::Retry("revision conflict on ns/id".into())
    }

    #[tokio::test]
    async fn test_succeeds_after_conflicts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_retry(&RetryConfig::eager(), "test", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(conflict())
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let config = RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 1,
        };
        let result: Result<(), _> = with_retry(&config, "link x", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(conflict())
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("cannot perform operation: link x: gave up after 3"));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_hard_failure_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_retry(&RetryConfig::eager(), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Attempt::from(StoreError::DeadlineExceeded))
        })
        .await;
        assert!(matches!(result, Err(ServiceError::CannotPerformOperation(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
