//! Timeout enforcement.
//!
//! Every remote call carries its own deadline, independent of whatever
//! timeout the transport applies.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The deadline for a call passed before it completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} exceeded")]
pub struct DeadlineExceeded(pub Duration);

/// Drive `future` to completion or give up after `limit`.
///
/// The future is dropped on expiry, which cancels any in-flight I/O it owns.
pub async fn with_deadline<F>(limit: Duration, future: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| DeadlineExceeded(limit))
}
