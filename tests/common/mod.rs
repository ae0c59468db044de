//! Test helpers for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum_test::TestServer;
use tempfile::TempDir;

use eforice::config::Config;
use eforice::{bootstrap, create_router, AppContext};

/// Password of the seeded administrator in tests.
pub const ADMIN_PASSWORD: &str = "admin-password-123";

/// Configuration with an in-memory database and a fixed admin password.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.session.secret = "test-secret-key-for-testing-only".to_string();
    config.admin.password = Some(ADMIN_PASSWORD.to_string());
    config.server.login_rate_limit = 100;
    config
}

/// Configuration whose database is a file inside `dir`.
pub fn file_db_config(dir: &Path) -> Config {
    let mut config = test_config();
    config.database.url = format!("sqlite:///{}", dir.join("eforice.db").display());
    config
}

/// Bootstrapped application plus a test server over its router.
pub struct TestApp {
    pub server: TestServer,
    pub ctx: Arc<AppContext>,
    pub dir: TempDir,
}

/// Bootstrap `config` in a fresh working directory and serve it.
pub async fn spawn_app(config: Config) -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let ctx = bootstrap(config, dir.path())
        .await
        .expect("Failed to bootstrap");
    let server = TestServer::new(create_router(ctx.clone())).expect("Failed to create test server");
    TestApp { server, ctx, dir }
}
