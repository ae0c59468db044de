//! Middleware and extractors for the web layer.

pub mod auth;
pub mod proxy;
pub mod rate_limit;
pub mod security;

pub use auth::{AuthRejection, CurrentUser, LoginRedirect, MaybeUser};
pub use proxy::{proxy_fix, ForwardedInfo, ProxyFix};
pub use rate_limit::{login_rate_limit, RateLimitState, CLEANUP_INTERVAL};
pub use security::security_headers;
