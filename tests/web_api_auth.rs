//! Web authentication tests.
//!
//! Login, logout, session resolution and the request boundary.

mod common;

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_extra::extract::cookie::Cookie;
use serde_json::Value;

use common::{spawn_app, test_config, TestApp, ADMIN_PASSWORD};
use eforice::auth::hash_password;
use eforice::{NewUser, UserRepository};

const SESSION_COOKIE: &str = "eforice_session";
const FLASH_COOKIE: &str = "eforice_flash";
const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

fn location(response: &axum_test::TestResponse) -> String {
    response
        .header(header::LOCATION)
        .to_str()
        .unwrap()
        .to_string()
}

/// Log in and return the session cookie.
async fn login(app: &TestApp, username: &str, password: &str) -> Cookie<'static> {
    let response = app
        .server
        .post("/login")
        .form(&[("username", username), ("password", password)])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    response.cookie(SESSION_COOKIE)
}

// ============================================================================
// Login required
// ============================================================================

#[tokio::test]
async fn test_anonymous_request_redirects_to_login() {
    let app = spawn_app(test_config()).await;

    let response = app.server.get("/me").await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fme");

    let flash = response.cookie(FLASH_COOKIE);
    let decoded = urlencoding::decode(flash.value()).unwrap().into_owned();
    assert_eq!(decoded, "info:Please log in to access this page.");
}

#[tokio::test]
async fn test_redirect_keeps_query_string() {
    let app = spawn_app(test_config()).await;

    let response = app.server.get("/me").add_query_param("tab", "files").await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fme%3Ftab%3Dfiles");
}

#[tokio::test]
async fn test_login_page_shows_and_clears_flash() {
    let app = spawn_app(test_config()).await;

    let redirect = app.server.get("/me").await;
    let flash = redirect.cookie(FLASH_COOKIE);

    let response = app
        .server
        .get("/login")
        .add_query_param("next", "/me")
        .add_cookie(flash)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["flash"]["category"], "info");
    assert_eq!(
        body["data"]["flash"]["message"],
        "Please log in to access this page."
    );
    assert_eq!(body["data"]["next"], "/me");
    assert_eq!(body["data"]["authenticated"], false);

    // The flash cookie is expired by the response
    let cleared = response.cookie(FLASH_COOKIE);
    assert_eq!(cleared.value(), "");
}

#[tokio::test]
async fn test_login_page_without_flash() {
    let app = spawn_app(test_config()).await;

    let response = app.server.get("/login").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["data"].get("flash").is_none());
}

#[tokio::test]
async fn test_forged_session_cookie_redirects() {
    let app = spawn_app(test_config()).await;

    let response = app
        .server
        .get("/me")
        .add_cookie(Cookie::new(SESSION_COOKIE, "forged.token.value"))
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_session_for_deleted_user_redirects() {
    let app = spawn_app(test_config()).await;
    let token = app.ctx.sessions.issue(9999).unwrap();

    let response = app
        .server
        .get("/me")
        .add_cookie(Cookie::new(SESSION_COOKIE, token))
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_success_resolves_session() {
    let app = spawn_app(test_config()).await;

    let session = login(&app, "admin", ADMIN_PASSWORD).await;
    assert_eq!(session.http_only(), Some(true));

    let response = app.server.get("/me").add_cookie(session).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["username"], "admin");
    assert_eq!(body["data"]["is_admin"], true);
    assert_eq!(body["data"]["storage_used"], 0);
    assert_eq!(body["data"]["storage_limit"], 10_737_418_240_i64);
    assert!(body["data"]["last_login"].is_string());
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_behind_https_proxy_sets_secure_cookie() {
    let app = spawn_app(test_config()).await;

    let response = app
        .server
        .post("/login")
        .add_header(
            HeaderName::from_static("x-forwarded-proto"),
            HeaderValue::from_static("https"),
        )
        .form(&[("username", "admin"), ("password", ADMIN_PASSWORD)])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.cookie(SESSION_COOKIE).secure(), Some(true));

    // Plain http stays without the flag
    let session = login(&app, "admin", ADMIN_PASSWORD).await;
    assert_ne!(session.secure(), Some(true));
}

#[tokio::test]
async fn test_login_username_case_insensitive() {
    let app = spawn_app(test_config()).await;
    let session = login(&app, "ADMIN", ADMIN_PASSWORD).await;

    app.server.get("/me").add_cookie(session).await.assert_status_ok();
}

#[tokio::test]
async fn test_login_redirects_to_next() {
    let app = spawn_app(test_config()).await;

    let response = app
        .server
        .post("/login")
        .form(&[
            ("username", "admin"),
            ("password", ADMIN_PASSWORD),
            ("next", "/me?tab=files"),
        ])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/me?tab=files");
}

#[tokio::test]
async fn test_login_ignores_external_next() {
    let app = spawn_app(test_config()).await;

    for next in ["//evil.example", "https://evil.example/", "/\\evil.example"] {
        let response = app
            .server
            .post("/login")
            .form(&[
                ("username", "admin"),
                ("password", ADMIN_PASSWORD),
                ("next", next),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/", "followed {next:?}");
    }
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = spawn_app(test_config()).await;

    let response = app
        .server
        .post("/login")
        .form(&[("username", "admin"), ("password", "wrong-password")])
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert!(response.maybe_cookie(SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = spawn_app(test_config()).await;

    let response = app
        .server
        .post("/login")
        .form(&[("username", "nobody"), ("password", "whatever-password")])
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unapproved_user_forbidden() {
    let app = spawn_app(test_config()).await;
    let hash = hash_password("member-password").unwrap();
    UserRepository::new(app.ctx.db.pool())
        .create(&NewUser::new("pending", "pending@example.com", hash, 1024))
        .await
        .unwrap();

    let response = app
        .server
        .post("/login")
        .form(&[("username", "pending"), ("password", "member-password")])
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_login_blank_fields_rejected() {
    let app = spawn_app(test_config()).await;

    let response = app
        .server
        .post("/login")
        .form(&[("username", " "), ("password", "")])
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["username"].is_array());
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_clears_session() {
    let app = spawn_app(test_config()).await;
    let session = login(&app, "admin", ADMIN_PASSWORD).await;

    let response = app.server.post("/logout").add_cookie(session).await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert_eq!(response.cookie(SESSION_COOKIE).value(), "");
}

// ============================================================================
// Request boundary
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = spawn_app(test_config()).await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
    assert_eq!(response.header("x-content-type-options"), "nosniff");
}

#[tokio::test]
async fn test_oversize_body_rejected() {
    let mut config = test_config();
    config.server.max_content_length = 1024;
    let app = spawn_app(config).await;

    let big = "x".repeat(4096);
    let response = app
        .server
        .post("/login")
        .form(&[("username", "admin"), ("password", big.as_str())])
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_login_rate_limited_per_forwarded_client() {
    let mut config = test_config();
    config.server.login_rate_limit = 2;
    let app = spawn_app(config).await;

    let attempt = |ip: &'static str| {
        app.server
            .post("/login")
            .add_header(X_FORWARDED_FOR, HeaderValue::from_static(ip))
            .form(&[("username", "admin"), ("password", "wrong-password")])
    };

    attempt("203.0.113.1").await.assert_status(StatusCode::UNAUTHORIZED);
    attempt("203.0.113.1").await.assert_status(StatusCode::UNAUTHORIZED);
    attempt("203.0.113.1")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    // Another client still gets through
    attempt("203.0.113.2").await.assert_status(StatusCode::UNAUTHORIZED);

    // Viewing the login page is not limited
    app.server
        .get("/login")
        .add_header(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.1"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_idle_rate_limit_entries_are_evicted() {
    let app = spawn_app(test_config()).await;

    for i in 0..50 {
        let ip = format!("198.51.100.{i}");
        app.server
            .post("/login")
            .add_header(X_FORWARDED_FOR, HeaderValue::from_str(&ip).unwrap())
            .form(&[("username", "admin"), ("password", "wrong-password")])
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
    assert_eq!(app.ctx.rate_limit.tracked_clients(), 50);

    // 100 attempts per minute replenish one every 600ms
    tokio::time::sleep(std::time::Duration::from_millis(800)).await;
    app.ctx.rate_limit.cleanup();

    assert_eq!(app.ctx.rate_limit.tracked_clients(), 0);
}
