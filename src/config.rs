//! Configuration module for eforice.
//!
//! Settings come from an optional TOML file; environment variables
//! override individual values afterwards.

use serde::Deserialize;
use std::path::Path;

use crate::{EforiceError, Result};

/// Session signing key used when `SESSION_SECRET` is not set.
pub const DEFAULT_SESSION_SECRET: &str = "eforice_default_secret";

/// Database URL used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///eforice.db";

const GIB: u64 = 1024 * 1024 * 1024;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted request body in bytes.
    #[serde(default = "default_max_content_length")]
    pub max_content_length: u64,
    /// Number of reverse proxies whose `X-Forwarded-*` headers are trusted (0 = none).
    #[serde(default = "default_trusted_proxy_hops")]
    pub trusted_proxy_hops: usize,
    /// Login attempts allowed per client per minute.
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_content_length() -> u64 {
    GIB
}

fn default_trusted_proxy_hops() -> usize {
    1
}

fn default_login_rate_limit() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_content_length: default_max_content_length(),
            trusted_proxy_hops: default_trusted_proxy_hops(),
            login_rate_limit: default_login_rate_limit(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`sqlite:///relative.db`, `sqlite:////abs.db`, `sqlite::memory:` ...).
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Pooled connections are replaced after this many seconds.
    #[serde(default = "default_pool_recycle")]
    pub pool_recycle_secs: u64,
    /// Check that a pooled connection is alive before handing it out.
    #[serde(default = "default_pool_pre_ping")]
    pub pool_pre_ping: bool,
    /// Seconds to wait for a connection from the pool.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_pool_recycle() -> u64 {
    300
}

fn default_pool_pre_ping() -> bool {
    true
}

fn default_acquire_timeout() -> u64 {
    30
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            pool_recycle_secs: default_pool_recycle(),
            pool_pre_ping: default_pool_pre_ping(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

/// Session and login configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Key used to sign session cookies.
    #[serde(default = "default_session_secret")]
    pub secret: String,
    /// Session lifetime in seconds.
    #[serde(default = "default_session_lifetime")]
    pub lifetime_secs: u64,
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Mark the session cookie `Secure` (HTTPS only).
    #[serde(default)]
    pub secure_cookie: bool,
    /// Path of the login view unauthenticated users are sent to.
    #[serde(default = "default_login_view")]
    pub login_view: String,
    /// Message flashed when a login is required.
    #[serde(default = "default_login_message")]
    pub login_message: String,
    /// Category of the flashed login message.
    #[serde(default = "default_login_message_category")]
    pub login_message_category: String,
}

fn default_session_secret() -> String {
    DEFAULT_SESSION_SECRET.to_string()
}

fn default_session_lifetime() -> u64 {
    7 * 24 * 60 * 60 // 7 days
}

fn default_cookie_name() -> String {
    "eforice_session".to_string()
}

fn default_login_view() -> String {
    "/login".to_string()
}

fn default_login_message() -> String {
    "Please log in to access this page.".to_string()
}

fn default_login_message_category() -> String {
    "info".to_string()
}

impl SessionConfig {
    /// Whether the built-in fallback secret is in use.
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_SESSION_SECRET
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: default_session_secret(),
            lifetime_secs: default_session_lifetime(),
            cookie_name: default_cookie_name(),
            secure_cookie: false,
            login_view: default_login_view(),
            login_message: default_login_message(),
            login_message_category: default_login_message_category(),
        }
    }
}

/// Bootstrap administrator account.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Username of the administrator.
    #[serde(default = "default_admin_username")]
    pub username: String,
    /// Email address of the administrator.
    #[serde(default = "default_admin_email")]
    pub email: String,
    /// Initial password. A random one is generated when unset.
    #[serde(default)]
    pub password: Option<String>,
    /// Storage quota of the administrator in bytes.
    #[serde(default = "default_admin_storage_limit")]
    pub storage_limit_bytes: i64,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_email() -> String {
    "admin@localhost".to_string()
}

fn default_admin_storage_limit() -> i64 {
    10 * GIB as i64
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            email: default_admin_email(),
            password: None,
            storage_limit_bytes: default_admin_storage_limit(),
        }
    }
}

/// Uploaded file storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Upload directory, relative to the working directory unless absolute.
    #[serde(default = "default_upload_folder")]
    pub upload_folder: String,
    /// Storage quota for newly registered users in bytes.
    #[serde(default = "default_user_storage_limit")]
    pub default_storage_limit_bytes: i64,
}

fn default_upload_folder() -> String {
    "uploads".to_string()
}

fn default_user_storage_limit() -> i64 {
    GIB as i64
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            upload_folder: default_upload_folder(),
            default_storage_limit_bytes: default_user_storage_limit(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file, written in addition to stdout.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Bootstrap administrator.
    #[serde(default)]
    pub admin: AdminConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(EforiceError::Io)?;
        Self::parse(&content)
    }

    /// Build a configuration from defaults and the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| EforiceError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `SESSION_SECRET`: session signing key
    /// - `DATABASE_URL`: database connection URL
    /// - `EFORICE_ADMIN_USERNAME`, `EFORICE_ADMIN_EMAIL`, `EFORICE_ADMIN_PASSWORD`:
    ///   bootstrap administrator credentials
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides using `lookup` to resolve variable names.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(secret) = get("SESSION_SECRET") {
            self.session.secret = secret;
        }
        if let Some(url) = get("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(username) = get("EFORICE_ADMIN_USERNAME") {
            self.admin.username = username;
        }
        if let Some(email) = get("EFORICE_ADMIN_EMAIL") {
            self.admin.email = email;
        }
        if let Some(password) = get("EFORICE_ADMIN_PASSWORD") {
            self.admin.password = Some(password);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.session.secret.is_empty() {
            return Err(EforiceError::Config("session secret is empty".to_string()));
        }
        if !self.session.login_view.starts_with('/') {
            return Err(EforiceError::Config(format!(
                "login_view must be an absolute path, got {:?}",
                self.session.login_view
            )));
        }
        if self.server.max_content_length == 0 {
            return Err(EforiceError::Config(
                "max_content_length must be greater than zero".to_string(),
            ));
        }
        if self.admin.username.trim().is_empty() {
            return Err(EforiceError::Config(
                "admin username must not be empty".to_string(),
            ));
        }
        if self.files.upload_folder.trim().is_empty() {
            return Err(EforiceError::Config(
                "upload_folder must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
