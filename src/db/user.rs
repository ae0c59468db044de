//! User model for eforice.

/// A registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login username (unique, case-insensitive).
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password hash (Argon2id PHC string).
    pub password_hash: String,
    /// Whether the user administers the instance.
    pub is_admin: bool,
    /// Whether an administrator has approved the account.
    pub is_approved: bool,
    /// Storage quota in bytes.
    pub storage_limit: i64,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last login timestamp.
    pub last_login: Option<String>,
}

impl User {
    /// Whether the account may sign in.
    pub fn can_login(&self) -> bool {
        self.is_approved
    }

    /// Bytes still available given `used` bytes already stored.
    pub fn remaining_quota(&self, used: i64) -> i64 {
        (self.storage_limit - used).max(0)
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password hash, already produced by [`crate::hash_password`].
    pub password_hash: String,
    /// Administrator flag.
    pub is_admin: bool,
    /// Approval flag.
    pub is_approved: bool,
    /// Storage quota in bytes.
    pub storage_limit: i64,
}

impl NewUser {
    /// Create an unapproved regular user with the given quota.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        storage_limit: i64,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            is_admin: false,
            is_approved: false,
            storage_limit,
        }
    }

    /// Mark the user as an administrator.
    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    /// Mark the user as approved.
    pub fn approved(mut self) -> Self {
        self.is_approved = true;
        self
    }
}
