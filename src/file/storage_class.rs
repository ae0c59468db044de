//! Storage classes.

use sqlx::SqlitePool;

use crate::{EforiceError, Result};

/// A storage tier files can be assigned to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StorageClass {
    /// Unique ID.
    pub id: i64,
    /// Unique name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
}

/// Repository for storage classes.
pub struct StorageClassRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StorageClassRepository<'a> {
    /// Create a new StorageClassRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a storage class.
    pub async fn create(&self, name: &str, description: Option<&str>) -> Result<StorageClass> {
        let result = sqlx::query("INSERT INTO storage_classes (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(self.pool)
            .await?;

        let id = result.last_insert_rowid();
        sqlx::query_as::<_, StorageClass>(
            "SELECT id, name, description FROM storage_classes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| EforiceError::NotFound("storage class".to_string()))
    }

    /// Get a storage class by name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<StorageClass>> {
        let class = sqlx::query_as::<_, StorageClass>(
            "SELECT id, name, description FROM storage_classes WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;
        Ok(class)
    }

    /// List all storage classes.
    pub async fn list(&self) -> Result<Vec<StorageClass>> {
        let classes = sqlx::query_as::<_, StorageClass>(
            "SELECT id, name, description FROM storage_classes ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(classes)
    }
}
