//! eforice - authenticated file storage.
//!
//! Application bootstrap: configuration, database, administrator
//! seeding, sessions and the upload directory, plus the HTTP routes
//! for logging in and out.

pub mod admin;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use admin::{seed_admin, SeedOutcome};
pub use app::{bootstrap, AppContext};
pub use auth::{
    authenticate, hash_password, load_user, validate_password, verify_password, LoginError,
    PasswordError, SessionManager,
};
pub use config::Config;
pub use db::{Database, DatabaseLocation, NewUser, User, UserRepository};
pub use error::{EforiceError, Result};
pub use file::UploadStorage;
pub use web::{create_router, WebServer};
