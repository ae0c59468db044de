//! Router configuration.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use super::handlers::{health, login, login_page, logout, me};
use super::middleware::{login_rate_limit, proxy_fix, security_headers, ProxyFix};
use crate::app::AppContext;

/// Create the application router.
pub fn create_router(ctx: Arc<AppContext>) -> Router {
    let server = &ctx.config.server;
    let body_limit = usize::try_from(server.max_content_length).unwrap_or(usize::MAX);
    let fix = ProxyFix {
        hops: server.trusted_proxy_hops,
    };

    let login_routes = Router::new()
        .route("/login", get(login_page).post(login))
        .route_layer(middleware::from_fn_with_state(ctx.clone(), login_rate_limit));

    Router::new()
        .route("/", get(me))
        .route("/me", get(me))
        .route("/logout", post(logout))
        .route("/health", get(health))
        .merge(login_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(fix, proxy_fix))
                .layer(middleware::from_fn(security_headers))
                .layer(RequestBodyLimitLayer::new(body_limit)),
        )
        .with_state(ctx)
}
