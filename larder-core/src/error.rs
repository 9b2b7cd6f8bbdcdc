use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Failure of a call to an external collaborator (catalog, cart).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// Run a remote call, converting an elapsed `limit` into `RemoteError::Timeout`.
pub async fn call_with_timeout<T, F>(limit: Duration, call: F) -> Result<T, RemoteError>
where
    F: Future<Output = Result<T, RemoteError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(RemoteError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_reported() {
        let result: Result<(), _> = call_with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(RemoteError::Timeout(Duration::from_millis(50))));
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let result: Result<(), _> = call_with_timeout(Duration::from_secs(1), async {
            Err(RemoteError::Unavailable("down".to_string()))
        })
        .await;
        assert!(matches!(result, Err(RemoteError::Unavailable(_))));
    }
}
