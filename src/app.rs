//! Application context and startup sequence.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::admin::{seed_admin, SeedOutcome};
use crate::auth::SessionManager;
use crate::config::Config;
use crate::file::UploadStorage;
use crate::web::middleware::{RateLimitState, CLEANUP_INTERVAL};
use crate::{Database, Result};

/// Everything request handlers share, built once at startup.
#[derive(Debug)]
pub struct AppContext {
    /// Resolved configuration.
    pub config: Config,
    /// Database pool.
    pub db: Database,
    /// Session token issuer.
    pub sessions: SessionManager,
    /// Upload directory.
    pub uploads: UploadStorage,
    /// Per-client login limiter.
    pub rate_limit: Arc<RateLimitState>,
}

/// Run the startup sequence and build the application context.
///
/// In order: open the database and apply migrations, seed the
/// administrator, ensure the upload directory under `base_dir`, then
/// start evicting idle login limiter entries. Any failure aborts startup.
pub async fn bootstrap(config: Config, base_dir: &Path) -> Result<Arc<AppContext>> {
    if config.session.uses_default_secret() {
        warn!("SESSION_SECRET is not set; sessions are signed with the built-in default secret");
    }

    let db = Database::connect(&config.database).await?;
    info!("Database ready");

    match seed_admin(&db, &config.admin).await? {
        SeedOutcome::Created { user_id, .. } => {
            info!(user_id, "Administrator account seeded");
        }
        SeedOutcome::AlreadyExists { user_id } => {
            info!(user_id, "Administrator account present");
        }
    }

    let uploads = UploadStorage::ensure(base_dir, &config.files.upload_folder)?;

    let sessions = SessionManager::new(&config.session);
    let rate_limit = Arc::new(RateLimitState::new(config.server.login_rate_limit));
    rate_limit.start_cleanup_task(CLEANUP_INTERVAL);

    Ok(Arc::new(AppContext {
        config,
        db,
        sessions,
        uploads,
        rate_limit,
    }))
}
