//! Request handlers for the web layer.

pub mod auth;
pub mod user;

use std::sync::Arc;

use axum::{extract::State, http::StatusCode};

use crate::app::AppContext;

pub use auth::{login, login_page, logout};
pub use user::me;

/// GET /health - `OK` while the database answers.
pub async fn health(State(ctx): State<Arc<AppContext>>) -> (StatusCode, &'static str) {
    match ctx.db.ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}
