//! Shared utilities for use cases.
//!
//! Cancellation checks used by the planner, executor and loop.

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Whether the (optional) run token has been cancelled.
pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(|t| t.is_cancelled())
}

/// Run `fut` unless the token fires first. `None` means cancelled.
pub(crate) async fn cancellable<F, T>(token: &Option<CancellationToken>, fut: F) -> Option<T>
where
    F: Future<Output = T>,
{
    match token {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                out = fut => Some(out),
            }
        }
        None => Some(fut.await),
    }
}
