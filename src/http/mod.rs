//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, metrics)
//!     → orders.rs / users.rs (handlers → services)
//!     → response.rs (service errors → status + JSON body)
//! ```

pub mod orders;
pub mod request;
pub mod response;
pub mod server;
pub mod users;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{order_router, user_router, HttpServer, OrderState, UserState};
