//! Signed session tokens for eforice.
//!
//! A session is an HS256 token whose subject is the user ID as a string.
//! It travels in an HttpOnly cookie and is verified on every request;
//! nothing is stored server side.

use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::{EforiceError, Result};

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID, string-encoded.
    pub sub: String,
    /// Issued at (unix seconds).
    pub iat: u64,
    /// Expiration (unix seconds).
    pub exp: u64,
    /// Unique token ID.
    pub jti: String,
}

/// Issues and verifies session tokens and builds the session cookie.
#[derive(Clone)]
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime_secs: u64,
    cookie_name: String,
    secure_cookie: bool,
}

impl SessionManager {
    /// Create a session manager from the session configuration.
    pub fn new(config: &SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            lifetime_secs: config.lifetime_secs,
            cookie_name: config.cookie_name.clone(),
            secure_cookie: config.secure_cookie,
        }
    }

    /// Issue a token for the given user.
    pub fn issue(&self, user_id: i64) -> Result<String> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now.saturating_add(self.lifetime_secs),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| EforiceError::Auth(format!("failed to sign session: {e}")))
    }

    /// Verify a token, returning its claims if the signature and expiry are valid.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("Session token rejected: {}", e);
                None
            }
        }
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Session lifetime in seconds.
    pub fn lifetime_secs(&self) -> u64 {
        self.lifetime_secs
    }

    /// Cookie carrying the given token.
    ///
    /// Marked `Secure` when configured so, or when the client reached
    /// us over https (`https` as seen through a trusted proxy).
    pub fn session_cookie(&self, token: String, https: bool) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookie || https)
            .build()
    }

    /// Cookie that clears the session when added to a jar's removals.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), "")).path("/").build()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("lifetime_secs", &self.lifetime_secs)
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}
