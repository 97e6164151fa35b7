//! Remote user lookup.
//!
//! # Data Flow
//! ```text
//! OrderEnrichmentService
//!     → CircuitBreaker::execute
//!     → UserLookup::fetch_user (this module)
//!     → http.rs (GET {base_url}/api/users/{id})
//! ```
//!
//! # Design Decisions
//! - The trait is the only contract the core depends on
//! - Transport details stay in http.rs
//! - NotFound is distinct from Unavailable; only the latter trips breakers

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{UserId, UserInfo};
use crate::resilience::RemoteFailure;

pub use http::{ClientError, HttpUserClient};

/// Breaker name for the order → user dependency edge.
pub const USER_SERVICE_EDGE: &str = "user-service";

/// Outcomes of a failed lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The user subsystem does not know this id.
    #[error("user {0} not found")]
    NotFound(UserId),

    /// Transport failure, timeout, or server error.
    #[error("user service unavailable: {0}")]
    Unavailable(String),
}

impl RemoteFailure for LookupError {
    fn is_dependency_failure(&self) -> bool {
        matches!(self, LookupError::Unavailable(_))
    }
}

/// Fetch a user's public details by id.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn fetch_user(&self, id: UserId) -> Result<UserInfo, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_trips_breaker() {
        assert!(!LookupError::NotFound(1).is_dependency_failure());
        assert!(LookupError::Unavailable("reset".into()).is_dependency_failure());
    }
}
