//! Request deadline propagation for store calls

use crate::StoreError;
use casebook_domain::RequestContext;
use std::future::Future;

/// Run a store call under the request's deadline
///
/// Without a deadline the call runs to completion. With one, the call is
/// dropped (and its in-flight work cancelled) once the deadline passes. A
/// deadline that has already passed fails without starting the call.
pub async fn with_deadline<T, F>(ctx: &RequestContext, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    if ctx.is_expired() {
        return Err(StoreError::DeadlineExceeded);
    }
    match ctx.deadline() {
        Some(deadline) => {
            tokio::time::timeout_at(tokio::time::Instant::from_std(deadline), call)
                .await
                .map_err(|_| StoreError::DeadlineExceeded)?
        }
        None => call.await,
    }
}
