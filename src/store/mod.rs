//! Persistence ports.
//!
//! The services depend only on these traits; `memory.rs` provides the
//! in-process implementation used by the binaries and tests.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{NewOrder, NewUser, Order, User, UserId};

pub use memory::{InMemoryOrderStore, InMemoryUserStore};

/// Errors that can occur while reading or writing records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store could not complete the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order, assigning its id and timestamps.
    async fn save(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Every order, ordered by id.
    async fn find_all(&self) -> Result<Vec<Order>, StoreError>;

    /// Orders owned by `user_id`, ordered by id.
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. Fails with [`StoreError::Conflict`] on a duplicate email.
    async fn save(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_all(&self) -> Result<Vec<User>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
