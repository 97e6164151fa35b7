//! Degraded results for the order → user edge.
//!
//! A fallback must not perform I/O or retry: it runs exactly when the
//! dependency is known to be unhealthy.

use crate::client::LookupError;
use crate::domain::{UserId, UserInfo};
use crate::resilience::CallFailure;

/// Produces a substitute [`UserInfo`] when a lookup cannot complete.
pub trait FallbackPolicy: Send + Sync {
    fn on_failure(&self, user_id: UserId, cause: &CallFailure<LookupError>) -> UserInfo;
}

/// Answers every failure with the "Unknown User" sentinel.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownUserFallback;

impl FallbackPolicy for UnknownUserFallback {
    fn on_failure(&self, user_id: UserId, _cause: &CallFailure<LookupError>) -> UserInfo {
        UserInfo::unknown(user_id)
    }
}
