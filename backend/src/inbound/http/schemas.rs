//! Shared wire-level DTOs for the HTTP adapter.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{User, UserRole, UserStatus};

/// Public representation of a user account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Stable identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub purchase_count: i32,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.to_string(),
            name: user.display_name.as_ref().map(ToString::to_string),
            role: user.role,
            status: user.status,
            google_id: user.google_id.clone(),
            avatar: user.avatar_url.clone(),
            purchase_count: user.purchase_count,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Bearer-token envelope returned by login endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
    pub user: UserResponse,
}

impl TokenResponse {
    /// Wrap an issued token with its user.
    pub fn bearer(access_token: String, user: &User) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_owned(),
            user: UserResponse::from(user),
        }
    }
}

/// Simple acknowledgement payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
