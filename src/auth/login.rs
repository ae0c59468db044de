//! Credential checks for eforice.

use thiserror::Error;
use tracing::{debug, info};

use super::password::{verify_password, PasswordError};
use crate::db::{User, UserRepository};
use crate::{Database, EforiceError};

/// Login failures.
#[derive(Error, Debug)]
pub enum LoginError {
    /// Unknown username or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has not been approved yet.
    #[error("account is awaiting approval")]
    NotApproved,

    /// Storage failure while checking credentials.
    #[error(transparent)]
    Internal(#[from] EforiceError),
}

/// Check a username and password.
///
/// On success the user's `last_login` is updated.
pub async fn authenticate(db: &Database, username: &str, password: &str) -> Result<User, LoginError> {
    let repo = UserRepository::new(db.pool());

    let Some(user) = repo.get_by_username(username).await? else {
        debug!(username = %username, "Login for unknown user");
        return Err(LoginError::InvalidCredentials);
    };

    match verify_password(password, &user.password_hash) {
        Ok(()) => {}
        Err(PasswordError::VerificationFailed) => {
            debug!(user_id = user.id, "Wrong password");
            return Err(LoginError::InvalidCredentials);
        }
        Err(e) => {
            return Err(LoginError::Internal(EforiceError::Password(e)));
        }
    }

    if !user.can_login() {
        return Err(LoginError::NotApproved);
    }

    repo.update_last_login(user.id).await?;
    info!(user_id = user.id, username = %user.username, "User logged in");

    Ok(user)
}
