use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::session::Claims;
use crate::error::AppError;

/// Extracts the authenticated user's id from request extensions.
///
/// Intended for routes behind [`crate::auth::SessionGuard`], which verifies
/// the session cookie and inserts the claims. If no claims are present the
/// request is treated as anonymous and redirected to the login entry point.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i32);

impl FromRequest for CurrentUser {
    type Error = ActixError; // AppError converts via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(CurrentUser(claims.sub))),
            None => {
                let err = AppError::Unauthorized(
                    "no session claims in request; is SessionGuard active?".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
