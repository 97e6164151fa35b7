//! User records owned by the user subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Placeholder name carried by the degraded-path sentinel.
pub const UNKNOWN_USER_NAME: &str = "Unknown User";

/// Placeholder email carried by the degraded-path sentinel.
pub const UNKNOWN_USER_EMAIL: &str = "unknown@example.com";

/// A persisted user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Request-scoped copy of a user's public details.
///
/// Unknown fields are ignored so the full `User` payload of the user
/// subsystem deserializes into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl UserInfo {
    /// Sentinel used when the real user cannot be resolved.
    pub fn unknown(id: UserId) -> Self {
        Self {
            id,
            name: UNKNOWN_USER_NAME.to_string(),
            email: UNKNOWN_USER_EMAIL.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_USER_NAME && self.email == UNKNOWN_USER_EMAIL
    }
}

/// Inbound payload for user creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
}

/// A validated user that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sentinel() {
        let info = UserInfo::unknown(42);
        assert_eq!(info.id, 42);
        assert_eq!(info.name, "Unknown User");
        assert!(info.is_unknown());
    }

    #[test]
    fn test_user_payload_deserializes_into_info() {
        let info: UserInfo = serde_json::from_str(
            r#"{"id": 1, "email": "kim@example.com", "name": "Kim",
                "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(info.name, "Kim");
        assert!(!info.is_unknown());
    }
}
