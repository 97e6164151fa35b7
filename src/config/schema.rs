//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::BreakerSettings;

/// Root configuration shared by the order and user services.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where the order service finds the user service.
    pub user_service: UserServiceConfig,

    /// Circuit breaker tuning.
    pub resilience: ResilienceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Total time allowed for an inbound request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Location of the user subsystem.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UserServiceConfig {
    /// Base URL, e.g. "http://127.0.0.1:8081".
    pub base_url: String,

    /// Transport-level timeout in milliseconds. The breaker's call timeout
    /// still applies on top of this.
    pub request_timeout_ms: u64,
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8081".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

/// Circuit breaker tuning, with optional per-edge overrides.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Consecutive failures before a circuit opens.
    pub failure_threshold: u32,

    /// Time an open circuit waits before a trial call, in milliseconds.
    pub cool_down_ms: u64,

    /// Deadline for each protected call, in milliseconds.
    pub call_timeout_ms: u64,

    /// Overrides keyed by dependency edge name.
    pub breakers: BTreeMap<String, BreakerOverride>,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cool_down_ms: 10_000,
            call_timeout_ms: 3_000,
            breakers: BTreeMap::new(),
        }
    }
}

impl ResilienceConfig {
    /// Effective settings for one edge.
    pub fn settings_for(&self, edge: &str) -> BreakerSettings {
        let overrides = self.breakers.get(edge).cloned().unwrap_or_default();
        BreakerSettings::new(
            overrides.failure_threshold.unwrap_or(self.failure_threshold),
            Duration::from_millis(overrides.cool_down_ms.unwrap_or(self.cool_down_ms)),
            Duration::from_millis(overrides.call_timeout_ms.unwrap_or(self.call_timeout_ms)),
        )
    }
}

/// Per-edge breaker override. Unset fields inherit the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerOverride {
    pub failure_threshold: Option<u32>,
    pub cool_down_ms: Option<u64>,
    pub call_timeout_ms: Option<u64>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:9091".to_string(),
        }
    }
}
