//! Resolve session subjects to users.

use crate::db::{User, UserRepository};
use crate::{Database, Result};

/// Load the user a session refers to.
///
/// `user_id` is the string-encoded ID stored in the session. Identifiers
/// that are not integers, or that name no user, resolve to `None`.
pub async fn load_user(db: &Database, user_id: &str) -> Result<Option<User>> {
    let Ok(id) = user_id.trim().parse::<i64>() else {
        return Ok(None);
    };

    UserRepository::new(db.pool()).get_by_id(id).await
}
