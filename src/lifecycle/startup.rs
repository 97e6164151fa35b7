//! Startup orchestration.
//!
//! Builds every component of a service from its configuration and runs its
//! listeners. Any construction error is fatal.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::admin::{setup_admin_router, AdminState};
use crate::client::{ClientError, HttpUserClient, UserLookup, USER_SERVICE_EDGE};
use crate::config::ServiceConfig;
use crate::http::{order_router, user_router, HttpServer, OrderState, UserState};
use crate::lifecycle::Shutdown;
use crate::resilience::{BreakerRegistry, UnknownUserFallback};
use crate::service::{OrderEnrichmentService, UserService};
use crate::store::{InMemoryOrderStore, InMemoryUserStore, OrderRepository};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("user service client: {0}")]
    Client(#[from] ClientError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The order service's wired components.
pub struct OrderComponents {
    pub service: OrderEnrichmentService,
    pub registry: Arc<BreakerRegistry>,
}

/// Wire the order service around the given store and user lookup.
pub fn wire_order_service(
    config: &ServiceConfig,
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserLookup>,
) -> OrderComponents {
    let mut registry = BreakerRegistry::new();
    let breaker = registry.register(USER_SERVICE_EDGE, &config.resilience);

    let service = OrderEnrichmentService::new(orders, users, breaker, Arc::new(UnknownUserFallback));

    OrderComponents {
        service,
        registry: Arc::new(registry),
    }
}

/// Run the user service until shutdown.
pub async fn run_user_service(
    config: ServiceConfig,
    listener: TcpListener,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    let users = UserService::new(Arc::new(InMemoryUserStore::new()));
    let router = user_router(
        UserState { users },
        Duration::from_secs(config.listener.request_timeout_secs),
    );

    HttpServer::new("user-service", router)
        .run(listener, shutdown.subscribe())
        .await?;
    Ok(())
}

/// Run the order service until shutdown.
///
/// Configurations received on `config_updates` retune the live breakers.
pub async fn run_order_service(
    config: ServiceConfig,
    listener: TcpListener,
    config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    let client = HttpUserClient::new(&config.user_service)?;
    tracing::info!(base_url = %config.user_service.base_url, "User service client ready");

    let components = wire_order_service(&config, Arc::new(InMemoryOrderStore::new()), Arc::new(client));

    tokio::spawn(apply_config_updates(
        components.registry.clone(),
        config_updates,
        shutdown.clone(),
    ));

    if config.admin.enabled {
        let admin_listener = TcpListener::bind(&config.admin.bind_address).await?;
        let admin = setup_admin_router(AdminState {
            registry: components.registry.clone(),
            api_key: Arc::from(config.admin.api_key.as_str()),
        });
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = HttpServer::new("admin", admin).run(admin_listener, admin_shutdown).await {
                tracing::error!(error = %e, "Admin server failed");
            }
        });
    }

    let router = order_router(
        OrderState {
            orders: components.service,
        },
        Duration::from_secs(config.listener.request_timeout_secs),
    );

    HttpServer::new("order-service", router)
        .run(listener, shutdown.subscribe())
        .await?;
    Ok(())
}

async fn apply_config_updates(
    registry: Arc<BreakerRegistry>,
    mut updates: mpsc::UnboundedReceiver<ServiceConfig>,
    shutdown: Shutdown,
) {
    let mut stop = shutdown.subscribe();
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(config) => {
                    tracing::info!("Applying reloaded resilience configuration");
                    registry.reconfigure(&config.resilience);
                }
                None => break,
            },
            _ = stop.recv() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::LookupError;
    use crate::domain::{UserId, UserInfo};
    use async_trait::async_trait;

    struct Down;

    #[async_trait]
    impl UserLookup for Down {
        async fn fetch_user(&self, _id: UserId) -> Result<UserInfo, LookupError> {
            Err(LookupError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_wiring_registers_user_edge() {
        let mut config = ServiceConfig::default();
        config.resilience.failure_threshold = 2;

        let components = wire_order_service(&config, Arc::new(InMemoryOrderStore::new()), Arc::new(Down));
        let breaker = components.registry.get(USER_SERVICE_EDGE).unwrap();
        assert_eq!(breaker.settings().failure_threshold, 2);
        assert_eq!(components.registry.len(), 1);
    }

    #[tokio::test]
    async fn test_config_updates_retune_breakers() {
        let config = ServiceConfig::default();
        let components = wire_order_service(&config, Arc::new(InMemoryOrderStore::new()), Arc::new(Down));
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = Shutdown::new();
        let task = tokio::spawn(apply_config_updates(components.registry.clone(), rx, shutdown.clone()));

        let mut updated = config.clone();
        updated.resilience.cool_down_ms = 1234;
        tx.send(updated).unwrap();
        drop(tx);
        task.await.unwrap();

        let breaker = components.registry.get(USER_SERVICE_EDGE).unwrap();
        assert_eq!(breaker.settings().cool_down, Duration::from_millis(1234));
    }
}
