//! Order service with a circuit-breaker-guarded user lookup.
//!
//! Orders are enriched with user details fetched from a separate user
//! service. That one remote edge is protected by a circuit breaker with a
//! degraded fallback, so order creation and listing keep working while the
//! user service is down.

pub mod admin;
pub mod client;
pub mod config;
pub mod domain;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod service;
pub mod store;

pub use config::ServiceConfig;
pub use lifecycle::shutdown::Shutdown;
pub use resilience::CircuitBreaker;
pub use service::OrderEnrichmentService;
