//! Login and logout handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Redirect,
    Extension, Json,
};
use axum_extra::extract::cookie::CookieJar;

use crate::app::AppContext;
use crate::auth::authenticate;
use crate::web::dto::{
    is_local_path, ApiResponse, LoginForm, LoginPageResponse, LoginQuery, ValidatedForm,
};
use crate::web::error::ApiError;
use crate::web::flash::take_flash;
use crate::web::middleware::{ForwardedInfo, MaybeUser};

/// GET /login - Login view.
///
/// Reports and consumes the pending flash message.
pub async fn login_page(
    MaybeUser(user): MaybeUser,
    Query(query): Query<LoginQuery>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<LoginPageResponse>>) {
    let (jar, flash) = take_flash(jar);
    let response = LoginPageResponse {
        flash,
        next: query.next.filter(|n| is_local_path(n)),
        authenticated: user.is_some(),
    };
    (jar, Json(ApiResponse::new(response)))
}

/// POST /login - Check credentials and start a session.
///
/// Redirects to `next` when it is a local path, otherwise to `/`.
/// The session cookie is `Secure` when a trusted proxy reports https.
pub async fn login(
    State(ctx): State<Arc<AppContext>>,
    forwarded: Option<Extension<ForwardedInfo>>,
    jar: CookieJar,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let user = authenticate(&ctx.db, form.username.trim(), &form.password).await?;

    let token = ctx.sessions.issue(user.id)?;
    let https = forwarded
        .as_ref()
        .is_some_and(|Extension(info)| info.scheme.as_deref() == Some("https"));
    let jar = jar.add(ctx.sessions.session_cookie(token, https));

    let target = form
        .next
        .as_deref()
        .filter(|n| is_local_path(n))
        .unwrap_or("/");

    Ok((jar, Redirect::to(target)))
}

/// POST /logout - End the session.
pub async fn logout(
    State(ctx): State<Arc<AppContext>>,
    MaybeUser(user): MaybeUser,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(user) = user {
        tracing::info!(user_id = user.id, "User logged out");
    }
    let jar = jar.remove(ctx.sessions.removal_cookie());
    (jar, Redirect::to(&ctx.config.session.login_view))
}
