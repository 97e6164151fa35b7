//! Application services.
//!
//! # Data Flow
//! ```text
//! HTTP handlers
//!     → orders.rs (OrderEnrichmentService: store + breaker-guarded lookup)
//!     → users.rs  (UserService: the user subsystem's own records)
//! ```

pub mod orders;
pub mod users;

pub use orders::{OrderEnrichmentService, OrderError};
pub use users::{UserError, UserService};
