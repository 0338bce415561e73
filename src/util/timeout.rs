//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::ProxyError;

/// Wrap a future with a timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, ProxyError>>,
) -> Result<T, ProxyError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(ProxyError::Timeout(duration.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn elapsed_future_becomes_timeout_error() {
        let result: Result<(), ProxyError> = with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(ProxyError::Timeout(50))));
    }

    #[tokio::test]
    async fn inner_result_passes_through() {
        let result = with_timeout(Duration::from_secs(1), async { Ok::<_, ProxyError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
