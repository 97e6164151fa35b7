//! In-memory repositories backed by `DashMap`.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{NewOrder, NewUser, Order, OrderId, OrderStatus, User, UserId};
use crate::store::{OrderRepository, StoreError, UserRepository};

/// Thread-safe order table with a monotonically increasing id sequence.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<DashMap<OrderId, Order>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn sorted(mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by_key(|o| o.id);
        orders
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn save(&self, order: NewOrder) -> Result<Order, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let now = Utc::now();
        let order = Order {
            id,
            user_id: order.user_id,
            product_name: order.product_name,
            quantity: order.quantity,
            unit_price: order.unit_price,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
        Ok(Self::sorted(self.orders.iter().map(|r| r.value().clone()).collect()))
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        Ok(Self::sorted(
            self.orders
                .iter()
                .filter(|r| r.value().user_id == user_id)
                .map(|r| r.value().clone())
                .collect(),
        ))
    }
}

/// Thread-safe user table with a unique email index.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<DashMap<UserId, User>>,
    by_email: Arc<DashMap<String, UserId>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn save(&self, user: NewUser) -> Result<User, StoreError> {
        let key = user.email.to_ascii_lowercase();
        let slot = match self.by_email.entry(key) {
            Entry::Occupied(_) => {
                return Err(StoreError::Conflict(format!("email '{}' already registered", user.email)))
            }
            Entry::Vacant(slot) => slot,
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let now = Utc::now();
        let user = User {
            id,
            email: user.email,
            name: user.name,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(id, user.clone());
        slot.insert(id);
        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.iter().map(|r| r.value().clone()).collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let id = match self.by_email.get(&email.to_ascii_lowercase()) {
            Some(r) => *r.value(),
            None => return Ok(None),
        };
        self.find_by_id(id).await
    }
}
