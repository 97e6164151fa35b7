//! The user subsystem's record management.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{CreateUserRequest, NewUser, User, UserId};
use crate::store::{StoreError, UserRepository};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("invalid user: {0}")]
    Validation(&'static str),

    #[error("user {0} not found")]
    NotFound(UserId),

    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("user store failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserError> {
        let email = request.email.trim();
        let name = request.name.trim();
        if email.is_empty() {
            return Err(UserError::Validation("email must not be blank"));
        }
        if !email.contains('@') {
            return Err(UserError::Validation("email must contain '@'"));
        }
        if name.is_empty() {
            return Err(UserError::Validation("name must not be blank"));
        }

        let saved = self
            .users
            .save(NewUser {
                email: email.to_string(),
                name: name.to_string(),
            })
            .await;

        match saved {
            Ok(user) => {
                tracing::info!(user_id = user.id, "User created");
                Ok(user)
            }
            Err(StoreError::Conflict(_)) => Err(UserError::DuplicateEmail(email.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, UserError> {
        Ok(self.users.find_all().await?)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, UserError> {
        let user = self.users.find_by_id(id).await?.ok_or(UserError::NotFound(id))?;
        tracing::debug!(user_id = id, name = %user.name, "User found");
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self.users.find_by_email(email).await?)
    }
}
