//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management: every operation failure the service can
//! produce is one of these variants, and the `actix_web::error::ResponseError`
//! implementation decides how each surfaces to the browser.
//!
//! The application is a redirect-driven web app, so recoverable failures do
//! not become bare status codes: an anonymous request to a protected route is
//! redirected to the login entry point, a non-admin mutation attempt is sent
//! back to the dashboard, and an unknown task id lands on the dashboard as
//! well, each with a flash message for the next page load. Store failures are
//! logged in full and surfaced as a generic 500.
//!
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, and `bcrypt::BcryptError` allow conversion
//! with the `?` operator.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::flash::{self, Flash};

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// No valid session on a route that requires one. Redirects to `/login`.
    Unauthorized(String),
    /// Authenticated, but the role does not permit the operation.
    /// Redirects to `/dashboard`.
    Forbidden(String),
    /// Unknown task id. Redirects to `/dashboard`.
    NotFound(String),
    /// Bad or missing input (empty title, unparseable deadline, malformed
    /// registration). Handlers normally recover this at the operation
    /// boundary with a flash redirect back to the originating form; the
    /// fallback response is a 422.
    Validation(String),
    /// Registration attempted with a username that already exists.
    /// Redirects back to `/register`.
    DuplicateUsername(String),
    /// Unknown username or password mismatch; the two are indistinguishable
    /// from the outside. Redirects back to `/login` without a session.
    InvalidCredentials,
    /// Underlying store failure. Logged in full, surfaced as a generic 500.
    Database(String),
    /// Unexpected server-side error (hashing, token signing, missing wiring).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DuplicateUsername(msg) => write!(f, "Duplicate Username: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid Credentials"),
            AppError::Database(msg) => write!(f, "Database Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => {
                log::debug!("unauthorized request: {}", msg);
                flash::redirect("/login", Flash::LoginRequired)
            }
            AppError::Forbidden(msg) => {
                log::debug!("forbidden request: {}", msg);
                flash::redirect("/dashboard", Flash::AdminRequired)
            }
            AppError::NotFound(_) => flash::redirect("/dashboard", Flash::TaskNotFound),
            AppError::InvalidCredentials => flash::redirect("/login", Flash::InvalidCredentials),
            AppError::DuplicateUsername(_) => {
                flash::redirect("/register", Flash::DuplicateUsername)
            }
            AppError::Validation(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
            // The store failure detail stays in the log; the client sees a
            // generic message.
            AppError::Database(msg) => {
                log::error!("database error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Something went wrong. Please try again."
                }))
            }
            AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Something went wrong. Please try again."
                }))
            }
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `NotFound`; everything else is a store failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::Database(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Session token processing failures (bad signature, expired) mean the
/// request is effectively anonymous.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{header, StatusCode};

    fn location(resp: &HttpResponse) -> &str {
        resp.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[test]
    fn test_anonymous_requests_redirect_to_login() {
        let resp = AppError::Unauthorized("no session".into()).error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/login");
    }

    #[test]
    fn test_forbidden_redirects_to_dashboard() {
        let resp = AppError::Forbidden("admin required".into()).error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/dashboard");
    }

    #[test]
    fn test_missing_task_redirects_to_dashboard() {
        let resp = AppError::NotFound("no such task".into()).error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/dashboard");
    }

    #[test]
    fn test_invalid_credentials_redirect_without_session() {
        let resp = AppError::InvalidCredentials.error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/login");

        // Only the flash cookie may be set; never a session.
        for value in resp.headers().get_all(header::SET_COOKIE) {
            assert!(!value.to_str().unwrap().starts_with("session="));
        }
    }

    #[test]
    fn test_duplicate_username_redirects_to_register() {
        let resp = AppError::DuplicateUsername("taken".into()).error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/register");
    }

    #[test]
    fn test_store_failures_are_generic_500() {
        let resp = AppError::Database("connection reset".into()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = AppError::Internal("hash failure".into()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
