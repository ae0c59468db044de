//! File metadata and repository for eforice file storage.

use sqlx::SqlitePool;

use crate::{EforiceError, Result};

const FILE_COLUMNS: &str =
    "id, filename, stored_name, size, mime_type, owner_id, folder_id, storage_class_id, created_at";

/// Metadata of an uploaded file.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileMetadata {
    /// Unique file ID.
    pub id: i64,
    /// Name the file was uploaded with.
    pub filename: String,
    /// Name inside the upload directory.
    pub stored_name: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// Owning user.
    pub owner_id: i64,
    /// Containing folder (None for top level).
    pub folder_id: Option<i64>,
    /// Storage class.
    pub storage_class_id: Option<i64>,
    /// Upload timestamp.
    pub created_at: String,
}

/// Data for recording a stored file.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Original filename.
    pub filename: String,
    /// Name returned by [`super::UploadStorage::save`].
    pub stored_name: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Owning user.
    pub owner_id: i64,
    /// Containing folder.
    pub folder_id: Option<i64>,
    /// Storage class.
    pub storage_class_id: Option<i64>,
}

impl NewFile {
    /// Create a top-level file record.
    pub fn new(
        filename: impl Into<String>,
        stored_name: impl Into<String>,
        size: i64,
        owner_id: i64,
    ) -> Self {
        Self {
            filename: filename.into(),
            stored_name: stored_name.into(),
            size,
            mime_type: None,
            owner_id,
            folder_id: None,
            storage_class_id: None,
        }
    }

    /// Set the containing folder.
    pub fn in_folder(mut self, folder_id: i64) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    /// Set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the storage class.
    pub fn with_storage_class(mut self, storage_class_id: i64) -> Self {
        self.storage_class_id = Some(storage_class_id);
        self
    }
}

/// Repository for file metadata.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a new file.
    pub async fn create(&self, file: &NewFile) -> Result<FileMetadata> {
        let result = sqlx::query(
            "INSERT INTO files (filename, stored_name, size, mime_type, owner_id, folder_id, storage_class_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&file.filename)
        .bind(&file.stored_name)
        .bind(file.size)
        .bind(&file.mime_type)
        .bind(file.owner_id)
        .bind(file.folder_id)
        .bind(file.storage_class_id)
        .execute(self.pool)
        .await?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| EforiceError::NotFound("file".to_string()))
    }

    /// Get a file by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileMetadata>> {
        let file = sqlx::query_as::<_, FileMetadata>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(file)
    }

    /// Get a file by its stored name.
    pub async fn get_by_stored_name(&self, stored_name: &str) -> Result<Option<FileMetadata>> {
        let file = sqlx::query_as::<_, FileMetadata>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE stored_name = ?"
        ))
        .bind(stored_name)
        .fetch_optional(self.pool)
        .await?;
        Ok(file)
    }

    /// List files in a folder.
    pub async fn list_by_folder(&self, folder_id: i64) -> Result<Vec<FileMetadata>> {
        let files = sqlx::query_as::<_, FileMetadata>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE folder_id = ? ORDER BY filename, id"
        ))
        .bind(folder_id)
        .fetch_all(self.pool)
        .await?;
        Ok(files)
    }

    /// Total bytes stored by a user.
    pub async fn total_size_by_owner(&self, owner_id: i64) -> Result<i64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(size), 0) FROM files WHERE owner_id = ?")
                .bind(owner_id)
                .fetch_one(self.pool)
                .await?;
        Ok(total)
    }

    /// Delete a file record.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
