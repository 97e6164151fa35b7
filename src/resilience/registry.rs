//! Named breakers, one per protected dependency edge.
//!
//! The registry is built by the startup wiring and handed to whoever needs
//! a breaker; there is no global lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ResilienceConfig;
use crate::resilience::{BreakerSnapshot, CircuitBreaker};

#[derive(Debug, Default)]
pub struct BreakerRegistry {
    breakers: BTreeMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create one breaker per edge using the configured tuning.
    pub fn from_config(config: &ResilienceConfig, edges: &[&str]) -> Self {
        let mut registry = Self::new();
        for edge in edges {
            registry.register(edge, config);
        }
        registry
    }

    /// Return the edge's breaker, creating it on first registration.
    pub fn register(&mut self, edge: &str, config: &ResilienceConfig) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(edge.to_string())
            .or_insert_with(|| {
                let settings = config.settings_for(edge);
                tracing::info!(
                    breaker = %edge,
                    failure_threshold = settings.failure_threshold,
                    cool_down_ms = settings.cool_down.as_millis() as u64,
                    "Circuit breaker registered"
                );
                Arc::new(CircuitBreaker::new(edge, settings))
            })
            .clone()
    }

    pub fn get(&self, edge: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(edge).cloned()
    }

    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        self.breakers.values().map(|b| b.snapshot()).collect()
    }

    /// Apply reloaded tuning to every registered breaker.
    pub fn reconfigure(&self, config: &ResilienceConfig) {
        for (edge, breaker) in &self.breakers {
            let settings = config.settings_for(edge);
            if *breaker.settings() != settings {
                breaker.reconfigure(settings);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BreakerOverride;
    use crate::resilience::CircuitState;

    #[test]
    fn test_one_breaker_per_edge() {
        let config = ResilienceConfig::default();
        let mut registry = BreakerRegistry::from_config(&config, &["user-service"]);

        let first = registry.get("user-service").unwrap();
        let again = registry.register("user-service", &config);
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("payment-service").is_none());
    }

    #[test]
    fn test_per_edge_override() {
        let mut config = ResilienceConfig::default();
        config.breakers.insert(
            "user-service".to_string(),
            BreakerOverride {
                failure_threshold: Some(2),
                ..Default::default()
            },
        );
        let registry = BreakerRegistry::from_config(&config, &["user-service", "other"]);

        assert_eq!(registry.get("user-service").unwrap().settings().failure_threshold, 2);
        assert_eq!(
            registry.get("other").unwrap().settings().failure_threshold,
            config.failure_threshold
        );
    }

    #[test]
    fn test_reconfigure() {
        let config = ResilienceConfig::default();
        let registry = BreakerRegistry::from_config(&config, &["user-service"]);

        let mut reloaded = config.clone();
        reloaded.failure_threshold = 9;
        registry.reconfigure(&reloaded);

        let snapshot = &registry.snapshots()[0];
        assert_eq!(snapshot.failure_threshold, 9);
        assert_eq!(snapshot.state, CircuitState::Closed);
    }
}
