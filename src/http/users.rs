//! User endpoints served by the user subsystem.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::{CreateUserRequest, UserId};
use crate::http::{ApiError, UserState};

/// `POST /api/users`
pub async fn create_user(
    State(state): State<UserState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let user = state.users.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// `GET /api/users`
pub async fn list_users(State(state): State<UserState>) -> Result<Response, ApiError> {
    let users = state.users.list_users().await?;
    Ok(Json(users).into_response())
}

/// `GET /api/users/{id}`
pub async fn get_user(
    State(state): State<UserState>,
    Path(id): Path<UserId>,
) -> Result<Response, ApiError> {
    tracing::info!(user_id = id, "User lookup requested");
    let user = state.users.get_user(id).await?;
    Ok(Json(user).into_response())
}

/// `GET /api/users/email/{email}`
pub async fn get_user_by_email(
    State(state): State<UserState>,
    Path(email): Path<String>,
) -> Result<Response, ApiError> {
    let user = state.users.find_by_email(&email).await?;
    Ok(Json(user).into_response())
}
