//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Remote call on a protected edge:
//!     → registry.rs (the edge's single CircuitBreaker)
//!     → circuit_breaker.rs (admit, short-circuit, or half-open trial)
//!     → timeouts.rs (enforce per-call deadline)
//!     → On failure: fallback.rs (degraded result, never an error)
//! ```
//!
//! # Design Decisions
//! - One breaker per dependency edge, owned by the startup wiring
//! - Fallbacks are plain function values passed to `execute`
//! - No retries inside a call; every retry is a fresh `execute`

pub mod circuit_breaker;
pub mod fallback;
pub mod registry;
pub mod timeouts;

pub use circuit_breaker::{
    BreakerSettings, BreakerSnapshot, CallFailure, CircuitBreaker, CircuitState, RemoteFailure,
};
pub use fallback::{FallbackPolicy, UnknownUserFallback};
pub use registry::BreakerRegistry;
