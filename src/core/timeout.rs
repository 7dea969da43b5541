//! Deadline wrapping for I/O-bound steps
//!
//! An operation is raced against a timer. When the timer wins the caller
//! gets [`Error::OperationTimeout`]; the operation itself is not killed,
//! its result is simply dropped. Blocking work runs on tokio's blocking
//! pool so a hung filesystem call cannot stall the runtime.
//!
//! @module core/timeout

use std::future::Future;
use std::time::Duration;

use super::error::{Error, Result};

/// Await `future`, failing with a typed timeout after `deadline`.
///
/// A zero deadline disables the race.
pub async fn with_deadline<F, T>(operation: &'static str, deadline: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if deadline.is_zero() {
        return future.await;
    }

    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::timeout(operation, deadline)),
    }
}

/// Run blocking `work` on the blocking pool under a deadline.
pub async fn with_blocking_deadline<F, T>(
    operation: &'static str,
    deadline: Duration,
    work: F,
) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(work);

    with_deadline(operation, deadline, async move {
        match handle.await {
            Ok(result) => result,
            Err(e) => Err(Error::Internal {
                message: format!("{} task failed: {}", operation, e),
            }),
        }
    })
    .await
}
