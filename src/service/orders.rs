//! Order creation and listing with user enrichment.
//!
//! Every user lookup goes through the order → user circuit breaker. Remote
//! failures never reach callers of this service: they degrade to the
//! fallback policy's sentinel instead.

use std::convert::Infallible;
use std::sync::Arc;

use thiserror::Error;

use crate::client::UserLookup;
use crate::domain::{CreateOrderRequest, EnrichedOrder, Order, UserId, UserInfo, ValidationError};
use crate::resilience::{CircuitBreaker, FallbackPolicy};
use crate::store::{OrderRepository, StoreError};

/// Errors surfaced to callers of [`OrderEnrichmentService`].
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("invalid order: {0}")]
    Validation(#[from] ValidationError),

    #[error("order store failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct OrderEnrichmentService {
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserLookup>,
    breaker: Arc<CircuitBreaker>,
    fallback: Arc<dyn FallbackPolicy>,
}

impl OrderEnrichmentService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserLookup>,
        breaker: Arc<CircuitBreaker>,
        fallback: Arc<dyn FallbackPolicy>,
    ) -> Self {
        Self {
            orders,
            users,
            breaker,
            fallback,
        }
    }

    /// Validate, check the user, and persist a new order.
    ///
    /// The order is stored even when the user cannot be confirmed; the
    /// returned value then carries the "Unknown User" sentinel.
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<EnrichedOrder, OrderError> {
        let new_order = request.validate().inspect_err(|e| {
            tracing::warn!(error = %e, "Rejected order request");
        })?;

        tracing::info!(
            user_id = new_order.user_id,
            product = %new_order.product_name,
            "Creating order"
        );

        let user = self.resolve_user(new_order.user_id).await;
        if user.is_unknown() {
            tracing::warn!(user_id = new_order.user_id, "Creating order without user validation");
        }

        let order = self.orders.save(new_order).await?;
        tracing::info!(order_id = order.id, user_id = order.user_id, "Order created");

        Ok(EnrichedOrder::new(&order, &user))
    }

    /// All orders of one user, joined with a single user lookup.
    pub async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<EnrichedOrder>, OrderError> {
        let orders = self.orders.find_by_user_id(user_id).await?;
        tracing::debug!(user_id, count = orders.len(), "Loaded orders for user");

        let user = self.resolve_user(user_id).await;

        Ok(orders.iter().map(|order| EnrichedOrder::new(order, &user)).collect())
    }

    /// All orders, without enrichment.
    pub async fn list_all_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.find_all().await?)
    }

    async fn resolve_user(&self, user_id: UserId) -> UserInfo {
        let fallback = &self.fallback;
        self.breaker
            .execute(
                || self.users.fetch_user(user_id),
                |cause| Ok::<_, Infallible>(fallback.on_failure(user_id, &cause)),
            )
            .await
            .unwrap_or_else(|never| match never {})
    }
}
