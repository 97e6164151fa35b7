//! Domain model shared by the order and user subsystems.
//!
//! # Data Flow
//! ```text
//! CreateOrderRequest (wire)
//!     → validate() → NewOrder
//!     → OrderRepository::save → Order
//!     → + UserInfo (remote lookup or sentinel) → EnrichedOrder
//! ```
//!
//! # Design Decisions
//! - Orders only hold the owning user's id; user data is request-scoped
//! - EnrichedOrder is recomputed per request and never persisted
//! - Wire names are camelCase

pub mod order;
pub mod user;

pub use order::{CreateOrderRequest, EnrichedOrder, NewOrder, Order, OrderStatus, ValidationError};
pub use user::{CreateUserRequest, NewUser, User, UserInfo};

/// Identifier of an order record.
pub type OrderId = i64;

/// Identifier of a user record.
pub type UserId = i64;
