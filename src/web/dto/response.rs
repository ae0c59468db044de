//! Response DTOs for the web layer.

use serde::Serialize;

use crate::db::User;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A one-shot message shown on the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    /// Message category (`info`, `error`, ...).
    pub category: String,
    /// Message text.
    pub message: String,
}

/// Login view.
#[derive(Debug, Serialize)]
pub struct LoginPageResponse {
    /// Pending flash message, consumed by this response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<FlashMessage>,
    /// Page to return to after logging in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Whether the requester is already logged in.
    pub authenticated: bool,
}

/// Current user information.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Administrator flag.
    pub is_admin: bool,
    /// Bytes stored.
    pub storage_used: i64,
    /// Quota in bytes.
    pub storage_limit: i64,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last login timestamp.
    pub last_login: Option<String>,
}

impl UserResponse {
    /// Build from a user and its current usage.
    pub fn new(user: User, storage_used: i64) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            storage_used,
            storage_limit: user.storage_limit,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}
