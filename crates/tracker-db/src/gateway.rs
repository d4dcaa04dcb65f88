//! # Query Gateway
//!
//! Runs a database operation with a single reconnect-and-retry.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  with_reconnect("list_expenses", op)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  op() ──► Ok(v) ─────────────────────────────────────────► Ok(v)        │
//! │       │                                                                 │
//! │       ├── Err(ConnectionLost) ──► warn! ──► op() again ──► result       │
//! │       │                     (pool hands out a fresh connection)         │
//! │       │                                                                 │
//! │       └── Err(anything else) ──────────────────────────► Err            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operations are closures so the retry can rebuild the query from scratch.
//! Transactions are retried as a whole: a broken connection rolls back the
//! first attempt before the second one begins.

use std::future::Future;

use tracing::warn;

use crate::error::DbResult;

/// Runs `op`, retrying exactly once if it fails with a lost connection.
///
/// ## Example
/// ```rust,ignore
/// let rows = with_reconnect("list_stock", move || repo.fetch_all()).await?;
/// ```
pub async fn with_reconnect<T, F, Fut>(operation: &str, mut op: F) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    match op().await {
        Err(err) if err.is_connection_lost() => {
            warn!(operation, error = %err, "Database connection lost, retrying once");
            op().await
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails with `first` on the first call, then succeeds.
    async fn flaky(attempts: &AtomicUsize, first: fn() -> DbError) -> DbResult<usize> {
        let n = attempts.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
            Err(first())
        } else {
            Ok(n)
        }
    }

    #[tokio::test]
    async fn test_success_runs_once() {
        let attempts = AtomicUsize::new(0);
        let attempts = &attempts;
        let result = with_reconnect("ok", move || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Ok::<_, DbError>(42)
        })
        .await
        .unwrap();

        assert_eq!(result, 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connection_lost_retries_once() {
        let attempts = AtomicUsize::new(0);
        let attempts = &attempts;
        let result = with_reconnect("flaky", move || {
            flaky(attempts, || DbError::ConnectionLost("broken pipe".to_string()))
        })
        .await
        .unwrap();

        assert_eq!(result, 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_failure_is_surfaced() {
        let attempts = AtomicUsize::new(0);
        let attempts = &attempts;
        let err = with_reconnect("down", move || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(DbError::ConnectionLost("still down".to_string()))
        })
        .await
        .unwrap_err();

        assert!(err.is_connection_lost());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let attempts = AtomicUsize::new(0);
        let attempts = &attempts;
        let err = with_reconnect("bad_sql", move || {
            flaky(attempts, || DbError::QueryFailed("no such table".to_string()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, DbError::QueryFailed(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
