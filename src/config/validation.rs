//! Configuration validation.
//!
//! Returns every problem found rather than stopping at the first one.

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{BreakerOverride, ServiceConfig};
use crate::observability::logging::LogFormat;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check value ranges and addresses.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be greater than 0"));
    }

    match Url::parse(&config.user_service.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "user_service.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("user_service.base_url", e.to_string())),
    }
    if config.user_service.request_timeout_ms == 0 {
        errors.push(ValidationError::new("user_service.request_timeout_ms", "must be greater than 0"));
    }

    let resilience = &config.resilience;
    let request_timeout_ms = config.listener.request_timeout_secs.saturating_mul(1000);
    check_breaker(
        &mut errors,
        "resilience",
        request_timeout_ms,
        &BreakerOverride {
            failure_threshold: Some(resilience.failure_threshold),
            cool_down_ms: Some(resilience.cool_down_ms),
            call_timeout_ms: Some(resilience.call_timeout_ms),
        },
    );
    for (edge, overrides) in &resilience.breakers {
        check_breaker(
            &mut errors,
            &format!("resilience.breakers.{edge}"),
            request_timeout_ms,
            overrides,
        );
    }

    if LogFormat::parse(&config.observability.log_format).is_none() {
        errors.push(ValidationError::new(
            "observability.log_format",
            "must be 'pretty' or 'json'",
        ));
    }
    if config.observability.metrics_enabled {
        check_addr(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    if config.admin.enabled {
        check_addr(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.trim().is_empty() {
            errors.push(ValidationError::new("admin.api_key", "must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("'{value}' is not a socket address")));
    }
}

/// The breaker's call deadline must fire before the server drops the
/// request, otherwise hung calls are cancelled instead of timing out.
fn check_breaker(
    errors: &mut Vec<ValidationError>,
    prefix: &str,
    request_timeout_ms: u64,
    breaker: &BreakerOverride,
) {
    if breaker.failure_threshold == Some(0) {
        errors.push(ValidationError::new(format!("{prefix}.failure_threshold"), "must be at least 1"));
    }
    if breaker.cool_down_ms == Some(0) {
        errors.push(ValidationError::new(format!("{prefix}.cool_down_ms"), "must be greater than 0"));
    }
    match breaker.call_timeout_ms {
        Some(0) => {
            errors.push(ValidationError::new(format!("{prefix}.call_timeout_ms"), "must be greater than 0"));
        }
        Some(ms) if request_timeout_ms > 0 && ms >= request_timeout_ms => {
            errors.push(ValidationError::new(
                format!("{prefix}.call_timeout_ms"),
                format!("must be below listener.request_timeout_secs ({request_timeout_ms} ms)"),
            ));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.resilience.failure_threshold = 0;
        config.resilience.cool_down_ms = 0;
        config.user_service.base_url = "ftp://users".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "user_service.base_url",
                "resilience.failure_threshold",
                "resilience.cool_down_ms",
            ]
        );
    }

    #[test]
    fn test_override_checked() {
        let mut config = ServiceConfig::default();
        config.resilience.breakers.insert(
            "user-service".to_string(),
            BreakerOverride {
                call_timeout_ms: Some(0),
                ..Default::default()
            },
        );
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "resilience.breakers.user-service.call_timeout_ms");
    }

    #[test]
    fn test_call_timeout_must_undercut_request_timeout() {
        let mut config = ServiceConfig::default();
        config.listener.request_timeout_secs = 2;
        config.resilience.call_timeout_ms = 2000;
        config.resilience.breakers.insert(
            "user-service".to_string(),
            BreakerOverride {
                call_timeout_ms: Some(5000),
                ..Default::default()
            },
        );

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "resilience.call_timeout_ms",
                "resilience.breakers.user-service.call_timeout_ms",
            ]
        );

        config.resilience.call_timeout_ms = 1999;
        config.resilience.breakers.clear();
        assert!(validate_config(&config).is_ok());
    }
}
