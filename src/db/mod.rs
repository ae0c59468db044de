//! Database module for eforice.
//!
//! Opens the SQLite connection pool described by the configuration and
//! brings the schema up to date.

mod repository;
mod schema;
mod user;

pub use repository::UserRepository;
pub use schema::MIGRATIONS;
pub use user::{NewUser, User};

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::{EforiceError, Result};

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Private in-memory database.
    Memory,
    /// Database file on disk.
    File(PathBuf),
}

impl DatabaseLocation {
    /// Parse a database URL.
    ///
    /// Both SQLAlchemy-style (`sqlite:///relative.db`, `sqlite:////abs.db`,
    /// `sqlite://`) and sqlx-style (`sqlite:file.db`, `sqlite://file.db`,
    /// `sqlite::memory:`) URLs are accepted. Relative paths resolve against
    /// the working directory. Query parameters are ignored.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        let rest = url.strip_prefix("sqlite:").ok_or_else(|| {
            EforiceError::Config(format!("unsupported database URL: {url:?}"))
        })?;
        let rest = rest.split('?').next().unwrap_or_default();

        let path = match rest.strip_prefix("//") {
            Some(after) => after.strip_prefix('/').unwrap_or(after),
            None => rest,
        };

        if path.is_empty() || path == ":memory:" {
            return Ok(Self::Memory);
        }
        if path.contains('\0') {
            return Err(EforiceError::Config(
                "database path contains a NUL byte".to_string(),
            ));
        }

        Ok(Self::File(PathBuf::from(path)))
    }
}

/// Handle to the connection pool.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect using the given configuration and apply pending migrations.
    ///
    /// File databases are created if missing. Pooled connections are
    /// recycled after `pool_recycle_secs` and, with `pool_pre_ping`,
    /// checked before each checkout.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let location = DatabaseLocation::parse(&config.url)?;
        let recycle = Duration::from_secs(config.pool_recycle_secs);

        let pool_options = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .test_before_acquire(config.pool_pre_ping);

        let pool = match &location {
            DatabaseLocation::File(path) => {
                info!("Opening database at {:?}", path);
                Self::ensure_parent_dir(path)?;

                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal);

                pool_options
                    .max_connections(config.max_connections.max(1))
                    .max_lifetime(recycle)
                    .idle_timeout(recycle)
                    .connect_with(Self::configure(options))
                    .await
            }
            DatabaseLocation::Memory => {
                debug!("Opening in-memory database");
                // Each connection would get its own empty database, so keep exactly one.
                pool_options
                    .max_connections(1)
                    .min_connections(1)
                    .max_lifetime(None::<Duration>)
                    .idle_timeout(None::<Duration>)
                    .connect_with(Self::configure(SqliteConnectOptions::from_str(
                        "sqlite::memory:",
                    )?))
                    .await
            }
        }
        .map_err(|e| EforiceError::DatabaseConnection(e.to_string()))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self> {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        };
        Self::connect(&config).await
    }

    fn configure(options: SqliteConnectOptions) -> SqliteConnectOptions {
        options
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
    }

    fn ensure_parent_dir(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run a trivial query to check the database is reachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Get the current schema version (0 for an empty database).
    pub async fn schema_version(&self) -> Result<i64> {
        if !self.table_exists("schema_version").await? {
            return Ok(0);
        }

        let version: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
                .fetch_one(&self.pool)
                .await?;
        Ok(version)
    }

    /// Apply pending migrations, each in its own transaction.
    pub async fn migrate(&self) -> Result<()> {
        let current_version = self.schema_version().await?;

        if current_version as usize >= MIGRATIONS.len() {
            debug!("Database is up to date (version {})", current_version);
            return Ok(());
        }

        info!(
            "Migrating database from version {} to {}",
            current_version,
            MIGRATIONS.len()
        );

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version     INTEGER PRIMARY KEY,
                applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&self.pool)
        .await?;

        for (i, migration) in MIGRATIONS.iter().enumerate().skip(current_version as usize) {
            let version = (i + 1) as i64;
            info!("Applying migration v{}", version);

            let mut tx = self.pool.begin().await?;
            sqlx::raw_sql(migration).execute(&mut *tx).await?;
            sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                .bind(version)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
        }

        info!(
            "Database migration complete (now at version {})",
            MIGRATIONS.len()
        );
        Ok(())
    }

    /// Check if a table exists.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(table_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}
