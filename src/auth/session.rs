//! Cookie-backed sessions.
//!
//! A session is a signed token (`jsonwebtoken` HMAC) bound to a user id,
//! transported in the `session` cookie. The cookie is HTTPS-only, invisible
//! to page scripts, and restricted to same-site requests. Signing keys are
//! built once from the configured secret and injected as application data;
//! nothing here reads the environment.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::HttpRequest;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const SESSION_COOKIE: &str = "session";
const SESSION_TTL_HOURS: i64 = 24;

/// Claims carried by the session token. The session binds only the user id;
/// the role is read from the store when an operation demands one.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The authenticated user's id.
    pub sub: i32,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signing and verification keys derived from the configured session secret.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues a session token for the given user id, valid for 24 hours.
    pub fn issue(&self, user_id: i32) -> Result<String, AppError> {
        let expiration = chrono::Utc::now()
            .checked_add_signed(chrono::Duration::hours(SESSION_TTL_HOURS))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id,
            exp: expiration,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
    }

    /// Verifies a session token. Signature and expiration checks apply; a
    /// failure means the request is treated as anonymous.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid session: {}", e)))
    }
}

/// Builds the session cookie for a freshly issued token.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::hours(SESSION_TTL_HOURS))
        .finish()
}

/// Removal cookie that destroys the session. Safe to send whether or not a
/// session exists, which makes logout idempotent.
pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .finish();
    cookie.make_removal();
    cookie
}

/// Reads the requester's user id from the session cookie, if a valid one is
/// present. Used by the public entry points to bounce already-authenticated
/// visitors to the dashboard.
pub fn session_user_id(req: &HttpRequest, keys: &SessionKeys) -> Option<i32> {
    let cookie = req.cookie(SESSION_COOKIE)?;
    keys.verify(cookie.value()).ok().map(|claims| claims.sub)
}
