use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::warn;

/// Retries `operation` with fibonacci backoff starting at `initial_delay`.
///
/// Only provisioning uses this, to wait out DynamoDB's asynchronous table
/// creation; request-path handlers never retry.
pub async fn retry_with_backoff<T, E, Fut, F>(
    mut operation: F,
    initial_delay: Duration,
    max_retries: usize,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retries = 0;
    let mut delay = (initial_delay, initial_delay);

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if retries < max_retries => {
                retries += 1;
                warn!("{err} (retry {retries}/{max_retries} in {:?})", delay.0);
                sleep(delay.0).await;
                delay = (delay.1, delay.0 + delay.1);
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn returns_the_first_success() {
        let calls = AtomicUsize::new(0);

        let result: Result<u32, String> = retry_with_backoff(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err("not ready".to_string())
                    } else {
                        Ok(7)
                    }
                }
            },
            Duration::from_millis(1),
            5,
        )
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicUsize::new(0);

        let result: Result<u32, String> = retry_with_backoff(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("boom".to_string()) }
            },
            Duration::from_millis(1),
            2,
        )
        .await;

        assert_eq!(result, Err("boom".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
