//! Order records and the enrichment view.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{OrderId, UserId, UserInfo};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub product_name: String,
    pub quantity: u32,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inbound payload for order creation, as received from callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderRequest {
    pub user_id: Option<UserId>,
    pub product_name: String,
    pub quantity: i64,
    pub price: Decimal,
}

/// A validated order that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Rejections of a [`CreateOrderRequest`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("userId is required")]
    MissingUserId,

    #[error("productName must not be blank")]
    BlankProductName,

    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),

    #[error("quantity {0} is out of range")]
    QuantityOutOfRange(i64),

    #[error("price must not be negative, got {0}")]
    NegativePrice(Decimal),
}

impl CreateOrderRequest {
    /// Check every field and produce a [`NewOrder`].
    pub fn validate(&self) -> Result<NewOrder, ValidationError> {
        let user_id = self.user_id.ok_or(ValidationError::MissingUserId)?;

        if self.product_name.trim().is_empty() {
            return Err(ValidationError::BlankProductName);
        }

        if self.quantity <= 0 {
            return Err(ValidationError::NonPositiveQuantity(self.quantity));
        }
        let quantity = u32::try_from(self.quantity)
            .map_err(|_| ValidationError::QuantityOutOfRange(self.quantity))?;

        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(ValidationError::NegativePrice(self.price));
        }

        Ok(NewOrder {
            user_id,
            product_name: self.product_name.trim().to_string(),
            quantity,
            unit_price: self.price,
        })
    }
}

/// Order fields joined with the owning user's details.
///
/// Built per request; carries the "Unknown User" sentinel when the user
/// subsystem could not be consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedOrder {
    pub order_id: OrderId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
}

impl EnrichedOrder {
    pub fn new(order: &Order, user: &UserInfo) -> Self {
        Self {
            order_id: order.id,
            product_name: order.product_name.clone(),
            quantity: order.quantity,
            price: order.unit_price,
            status: order.status,
            created_at: order.created_at,
            user_id: user.id,
            user_name: user.name.clone(),
            user_email: user.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: Some(7),
            product_name: "Keyboard".to_string(),
            quantity: 2,
            price: Decimal::new(4999, 2),
        }
    }

    #[test]
    fn test_valid_request() {
        let order = request().validate().unwrap();
        assert_eq!(order.user_id, 7);
        assert_eq!(order.quantity, 2);
        assert_eq!(order.unit_price.to_string(), "49.99");
    }

    #[test]
    fn test_missing_user_id() {
        let mut req = request();
        req.user_id = None;
        assert_eq!(req.validate(), Err(ValidationError::MissingUserId));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut req = request();
        req.quantity = 0;
        assert_eq!(req.validate(), Err(ValidationError::NonPositiveQuantity(0)));
    }

    #[test]
    fn test_price_bounds() {
        let mut req = request();
        req.price = Decimal::ZERO;
        assert!(req.validate().is_ok());

        req.price = Decimal::new(-1, 2);
        assert!(matches!(req.validate(), Err(ValidationError::NegativePrice(_))));
    }

    #[test]
    fn test_blank_product_name() {
        let mut req = request();
        req.product_name = "   ".to_string();
        assert_eq!(req.validate(), Err(ValidationError::BlankProductName));
    }

    #[test]
    fn test_request_wire_format() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{"userId": 3, "productName": "Mouse", "quantity": 1, "price": "12.50"}"#,
        )
        .unwrap();
        assert_eq!(req.user_id, Some(3));
        assert_eq!(req.price, Decimal::new(1250, 2));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
    }
}
