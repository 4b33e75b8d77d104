pub mod extractors;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod session;

use lazy_static::lazy_static;
use serde::Deserialize;
use validator::Validate;

// Re-export necessary items
pub use extractors::CurrentUser;
pub use middleware::SessionGuard;
pub use password::{hash_password, verify_password};
pub use session::{Claims, SessionKeys};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Login form fields. Not validated beyond presence: a malformed username or
/// password simply fails to authenticate, indistinguishable from a wrong one.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form fields.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    /// Between 3 and 32 characters, alphanumeric plus underscores or hyphens.
    /// Case-sensitive and immutable once registered.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// At least 6 characters.
    #[validate(length(min = 6))]
    pub password: String,
}
