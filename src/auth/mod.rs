//! Authentication module for eforice.
//!
//! Password hashing, signed session tokens, and resolution of a session
//! back to its user.

mod loader;
mod login;
mod password;
mod session;

pub use loader::load_user;
pub use login::{authenticate, LoginError};
pub use password::{
    generate_password, hash_password, validate_password, verify_password, PasswordError,
    GENERATED_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
pub use session::{SessionClaims, SessionManager};
