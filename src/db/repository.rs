//! User repository for eforice.

use sqlx::{Executor, Sqlite, SqlitePool};

use super::user::{NewUser, User};
use crate::{EforiceError, Result};

const USER_COLUMNS: &str = "id, username, email, password_hash, is_admin, is_approved,
                            storage_limit, created_at, last_login";

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user through any executor, returning the new ID.
    ///
    /// Used directly when the insert must share a transaction.
    pub async fn insert<'e, E>(executor: E, new_user: &NewUser) -> sqlx::Result<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, is_admin, is_approved, storage_limit)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.is_admin)
        .bind(new_user.is_approved)
        .bind(new_user.storage_limit)
        .execute(executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Find the ID of a user by username (case-insensitive) through any executor.
    pub async fn find_id_by_username<'e, E>(executor: E, username: &str) -> sqlx::Result<Option<i64>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT id FROM users WHERE username = ? COLLATE NOCASE")
            .bind(username)
            .fetch_optional(executor)
            .await
    }

    /// Create a new user and return it.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id = Self::insert(self.pool, new_user).await?;
        self.get_by_id(id)
            .await?
            .ok_or_else(|| EforiceError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? COLLATE NOCASE"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Check if a username is already taken (case-insensitive).
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        Ok(Self::find_id_by_username(self.pool, username)
            .await?
            .is_some())
    }

    /// List administrators.
    pub async fn list_admins(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_admin = 1 ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(users)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Update the last login timestamp for a user.
    pub async fn update_last_login(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = datetime('now') WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Set the approval flag. Returns false if the user does not exist.
    pub async fn set_approved(&self, id: i64, approved: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET is_approved = ? WHERE id = ?")
            .bind(approved)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
