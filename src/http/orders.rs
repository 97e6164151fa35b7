//! Order endpoints.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::domain::{CreateOrderRequest, UserId};
use crate::http::{ApiError, OrderState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    pub user_id: Option<UserId>,
}

/// `POST /orders`
pub async fn create_order(
    State(state): State<OrderState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let order = state.orders.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(order)).into_response())
}

/// `GET /orders[?userId=N]`
///
/// With a user id the orders are enriched with that user's details;
/// without one the bare records are returned.
pub async fn list_orders(
    State(state): State<OrderState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Response, ApiError> {
    match query.user_id {
        Some(user_id) => {
            let orders = state.orders.list_orders_for_user(user_id).await?;
            Ok(Json(orders).into_response())
        }
        None => {
            let orders = state.orders.list_all_orders().await?;
            Ok(Json(orders).into_response())
        }
    }
}
