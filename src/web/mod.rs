//! Web layer for eforice.
//!
//! Login, logout and current-user routes over the shared
//! [`AppContext`](crate::app::AppContext), behind body-limit, proxy and
//! security-header middleware.

pub mod dto;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
