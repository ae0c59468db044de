//! Bootstrap administrator seeding.

use tracing::{info, warn};

use crate::auth::{generate_password, hash_password};
use crate::config::AdminConfig;
use crate::db::{NewUser, UserRepository};
use crate::{Database, Result};

/// Result of [`seed_admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The administrator was inserted.
    Created {
        /// ID of the new account.
        user_id: i64,
        /// Password generated because none was configured.
        generated_password: Option<String>,
    },
    /// An account with the configured username already existed; nothing changed.
    AlreadyExists {
        /// ID of the existing account.
        user_id: i64,
    },
}

impl SeedOutcome {
    /// ID of the administrator account.
    pub fn user_id(&self) -> i64 {
        match self {
            SeedOutcome::Created { user_id, .. } | SeedOutcome::AlreadyExists { user_id } => {
                *user_id
            }
        }
    }

    /// Whether this call created the account.
    pub fn created(&self) -> bool {
        matches!(self, SeedOutcome::Created { .. })
    }
}

/// Create the administrator account unless its username is taken.
///
/// Lookup and insert share one transaction. A concurrent insert of the
/// same username is reported as `AlreadyExists`. The existing account is
/// never modified, so a changed configured password does not reset it.
pub async fn seed_admin(db: &Database, config: &AdminConfig) -> Result<SeedOutcome> {
    let mut tx = db.pool().begin().await?;

    if let Some(user_id) = UserRepository::find_id_by_username(&mut *tx, &config.username).await? {
        tx.rollback().await?;
        info!(username = %config.username, "Admin user already exists");
        return Ok(SeedOutcome::AlreadyExists { user_id });
    }

    let (password, generated) = match config.password.as_deref() {
        Some(password) => (password.to_string(), false),
        None => (generate_password(), true),
    };
    let password_hash = hash_password(&password)?;

    let new_user = NewUser::new(
        &config.username,
        &config.email,
        password_hash,
        config.storage_limit_bytes,
    )
    .admin()
    .approved();

    let user_id = match UserRepository::insert(&mut *tx, &new_user).await {
        Ok(id) => id,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            drop(tx);
            let user_id = UserRepository::find_id_by_username(db.pool(), &config.username)
                .await?
                .ok_or_else(|| crate::EforiceError::NotFound("admin user".to_string()))?;
            return Ok(SeedOutcome::AlreadyExists { user_id });
        }
        Err(e) => return Err(e.into()),
    };
    tx.commit().await?;

    info!(user_id, username = %config.username, "Admin user created");
    if generated {
        warn!(
            username = %config.username,
            "Generated admin password: {} (set EFORICE_ADMIN_PASSWORD to choose one)",
            password
        );
    }

    Ok(SeedOutcome::Created {
        user_id,
        generated_password: generated.then_some(password),
    })
}
