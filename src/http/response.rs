//! Mapping of service errors to HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::service::{OrderError, UserError};

/// An error rendered as `{ "error": <code>, "message": <text> }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "Request failed");
        }
        let body = Json(json!({
            "error": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(e) => ApiError::new(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
            OrderError::Store(e) => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let message = err.to_string();
        match err {
            UserError::Validation(_) => ApiError::new(StatusCode::BAD_REQUEST, "validation_error", message),
            UserError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, "not_found", message),
            UserError::DuplicateEmail(_) => ApiError::new(StatusCode::CONFLICT, "duplicate_email", message),
            UserError::Store(_) => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;
    use crate::store::StoreError;

    #[test]
    fn test_status_mapping() {
        let err: ApiError = OrderError::Validation(ValidationError::MissingUserId).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = UserError::NotFound(3).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "user 3 not found");

        let err: ApiError = UserError::DuplicateEmail("a@b.c".into()).into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: ApiError = OrderError::Store(StoreError::Unavailable("disk".into())).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
