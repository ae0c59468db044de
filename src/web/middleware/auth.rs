//! Session authentication extractors.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::app::AppContext;
use crate::auth::load_user;
use crate::db::User;
use crate::web::error::ApiError;
use crate::web::flash::flash_cookie;

/// Resolve the session cookie of a request to a user.
///
/// Missing, forged or expired cookies and unknown users all give `None`.
async fn resolve_user(parts: &Parts, ctx: &AppContext) -> crate::Result<Option<User>> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(cookie) = jar.get(ctx.sessions.cookie_name()) else {
        return Ok(None);
    };
    let Some(claims) = ctx.sessions.verify(cookie.value()) else {
        return Ok(None);
    };
    load_user(&ctx.db, &claims.sub).await
}

/// Redirect to the login view, remembering the requested page.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    location: String,
    category: String,
    message: String,
}

impl LoginRedirect {
    /// Build the redirect for a request to `next`.
    pub fn new(ctx: &AppContext, next: &str) -> Self {
        let session = &ctx.config.session;
        Self {
            location: format!("{}?next={}", session.login_view, urlencoding::encode(next)),
            category: session.login_message_category.clone(),
            message: session.login_message.clone(),
        }
    }

    /// Target of the redirect.
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        let jar = CookieJar::new().add(flash_cookie(&self.category, &self.message));
        (jar, Redirect::to(&self.location)).into_response()
    }
}

/// Rejection of [`CurrentUser`].
#[derive(Debug)]
pub enum AuthRejection {
    /// Not logged in.
    Login(LoginRedirect),
    /// The user could not be loaded.
    Internal(ApiError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Login(redirect) => redirect.into_response(),
            AuthRejection::Internal(err) => err.into_response(),
        }
    }
}

/// Extractor for routes that require a logged-in user.
///
/// Anonymous requests are redirected to the login view with a flash
/// message.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppContext>> for CurrentUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        match resolve_user(parts, ctx).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                tracing::debug!(path = %next, "Login required");
                Err(AuthRejection::Login(LoginRedirect::new(ctx, next)))
            }
            Err(e) => Err(AuthRejection::Internal(e.into())),
        }
    }
}

/// Extractor that yields the user if logged in and never rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<Arc<AppContext>> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        match resolve_user(parts, ctx).await {
            Ok(user) => Ok(MaybeUser(user)),
            Err(e) => {
                tracing::warn!("Failed to load session user: {}", e);
                Ok(MaybeUser(None))
            }
        }
    }
}
