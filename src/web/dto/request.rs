//! Request DTOs for the web layer.

use serde::Deserialize;
use validator::Validate;

use super::validation::not_empty_trimmed;

/// Login form.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    /// Username.
    #[validate(
        length(max = 64, message = "Username is too long"),
        custom(function = "not_empty_trimmed")
    )]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
    /// Where to go after logging in.
    #[serde(default)]
    pub next: Option<String>,
}

/// Query of the login view.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// Page that required the login.
    #[serde(default)]
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, password: &str) -> LoginForm {
        LoginForm {
            username: username.to_string(),
            password: password.to_string(),
            next: None,
        }
    }

    #[test]
    fn test_login_form_valid() {
        assert!(form("alice", "secret-password").validate().is_ok());
    }

    #[test]
    fn test_login_form_blank_fields() {
        let errors = form("  ", "").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
    }
}
