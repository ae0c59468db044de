//! Folder types and repository for eforice file storage.

use sqlx::SqlitePool;

use crate::{EforiceError, Result};

/// A user-owned folder. Folders nest through `parent_id`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
    /// Owning user.
    pub owner_id: i64,
    /// Parent folder ID (None for top-level folders).
    pub parent_id: Option<i64>,
    /// When the folder was created.
    pub created_at: String,
}

impl Folder {
    /// Whether this is a top-level folder.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Folder name.
    pub name: String,
    /// Owning user.
    pub owner_id: i64,
    /// Parent folder ID.
    pub parent_id: Option<i64>,
}

impl NewFolder {
    /// Create a top-level folder for `owner_id`.
    pub fn new(name: impl Into<String>, owner_id: i64) -> Self {
        Self {
            name: name.into(),
            owner_id,
            parent_id: None,
        }
    }

    /// Place the folder inside `parent_id`.
    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Repository for folder operations.
pub struct FolderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new folder.
    pub async fn create(&self, folder: &NewFolder) -> Result<Folder> {
        let result = sqlx::query("INSERT INTO folders (name, owner_id, parent_id) VALUES (?, ?, ?)")
            .bind(&folder.name)
            .bind(folder.owner_id)
            .bind(folder.parent_id)
            .execute(self.pool)
            .await?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| EforiceError::NotFound("folder".to_string()))
    }

    /// Get a folder by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            "SELECT id, name, owner_id, parent_id, created_at FROM folders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(folder)
    }

    /// List the top-level folders of a user.
    pub async fn list_root_by_owner(&self, owner_id: i64) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT id, name, owner_id, parent_id, created_at
             FROM folders WHERE owner_id = ? AND parent_id IS NULL ORDER BY name, id",
        )
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;
        Ok(folders)
    }

    /// List all folders of a user.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT id, name, owner_id, parent_id, created_at
             FROM folders WHERE owner_id = ? ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;
        Ok(folders)
    }

    /// List direct children of a folder.
    pub async fn list_children(&self, parent_id: i64) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT id, name, owner_id, parent_id, created_at
             FROM folders WHERE parent_id = ? ORDER BY name, id",
        )
        .bind(parent_id)
        .fetch_all(self.pool)
        .await?;
        Ok(folders)
    }

    /// Delete a folder with its subfolders and files rows.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("alice", "alice@example.com", "hash", 1024))
            .await
            .unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn test_create_folder() {
        let (db, owner) = setup().await;
        let repo = FolderRepository::new(db.pool());

        let folder = repo.create(&NewFolder::new("Documents", owner)).await.unwrap();

        assert_eq!(folder.name, "Documents");
        assert_eq!(folder.owner_id, owner);
        assert!(folder.is_root());
    }

    #[tokio::test]
    async fn test_create_folder_unknown_owner_fails() {
        let (db, _) = setup().await;
        let repo = FolderRepository::new(db.pool());

        assert!(repo.create(&NewFolder::new("Orphan", 999)).await.is_err());
    }

    #[tokio::test]
    async fn test_children_and_roots() {
        let (db, owner) = setup().await;
        let repo = FolderRepository::new(db.pool());

        let parent = repo.create(&NewFolder::new("Photos", owner)).await.unwrap();
        repo.create(&NewFolder::new("2024", owner).with_parent(parent.id))
            .await
            .unwrap();
        repo.create(&NewFolder::new("2023", owner).with_parent(parent.id))
            .await
            .unwrap();

        let children = repo.list_children(parent.id).await.unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name, "2023");

        let roots = repo.list_root_by_owner(owner).await.unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(repo.list_by_owner(owner).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_children() {
        let (db, owner) = setup().await;
        let repo = FolderRepository::new(db.pool());

        let parent = repo.create(&NewFolder::new("Parent", owner)).await.unwrap();
        let child = repo
            .create(&NewFolder::new("Child", owner).with_parent(parent.id))
            .await
            .unwrap();

        assert!(repo.delete(parent.id).await.unwrap());
        assert!(repo.get_by_id(child.id).await.unwrap().is_none());
        assert!(!repo.delete(parent.id).await.unwrap());
    }
}
