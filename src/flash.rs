//! One-shot flash messages.
//!
//! The original application surfaces user-facing outcomes (bad credentials,
//! missing permissions, task added, ...) as flash messages on the next page
//! load. Rendering is an external collaborator, so the message travels as a
//! stable code in a short-lived cookie; whichever view payload consumes it
//! also clears the cookie.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use serde_json::json;

pub const FLASH_COOKIE: &str = "flash";

/// Every flash message the application can emit.
///
/// The cookie carries `code()`; view payloads carry both the code and the
/// human-readable `message()` so the renderer can show either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    LoggedIn,
    LoggedOut,
    Registered,
    InvalidCredentials,
    DuplicateUsername,
    InvalidRegistration,
    LoginRequired,
    AdminRequired,
    InvalidTask,
    TaskAdded,
    TaskDeleted,
    TaskNotFound,
}

impl Flash {
    pub fn code(self) -> &'static str {
        match self {
            Flash::LoggedIn => "logged-in",
            Flash::LoggedOut => "logged-out",
            Flash::Registered => "registered",
            Flash::InvalidCredentials => "invalid-credentials",
            Flash::DuplicateUsername => "duplicate-username",
            Flash::InvalidRegistration => "invalid-registration",
            Flash::LoginRequired => "login-required",
            Flash::AdminRequired => "admin-required",
            Flash::InvalidTask => "invalid-task",
            Flash::TaskAdded => "task-added",
            Flash::TaskDeleted => "task-deleted",
            Flash::TaskNotFound => "task-not-found",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::LoggedIn => "Logged in successfully.",
            Flash::LoggedOut => "Logged out.",
            Flash::Registered => "User registered successfully.",
            Flash::InvalidCredentials => "Invalid username or password.",
            Flash::DuplicateUsername => "Username already exists.",
            Flash::InvalidRegistration => {
                "Username must be 3-32 characters (letters, digits, _ or -) \
                 and the password at least 6 characters."
            }
            Flash::LoginRequired => "Please log in to continue.",
            Flash::AdminRequired => "You do not have permission to perform this action.",
            Flash::InvalidTask => "A task needs a title and a YYYY-MM-DD deadline.",
            Flash::TaskAdded => "Task added.",
            Flash::TaskDeleted => "Task deleted.",
            Flash::TaskNotFound => "Task not found.",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        [
            Flash::LoggedIn,
            Flash::LoggedOut,
            Flash::Registered,
            Flash::InvalidCredentials,
            Flash::DuplicateUsername,
            Flash::InvalidRegistration,
            Flash::LoginRequired,
            Flash::AdminRequired,
            Flash::InvalidTask,
            Flash::TaskAdded,
            Flash::TaskDeleted,
            Flash::TaskNotFound,
        ]
        .into_iter()
        .find(|flash| flash.code() == code)
    }

    pub fn cookie(self) -> Cookie<'static> {
        Cookie::build(FLASH_COOKIE, self.code())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish()
    }

    /// JSON shape handed to the rendering collaborator.
    pub fn payload(self) -> serde_json::Value {
        json!({ "code": self.code(), "message": self.message() })
    }
}

/// Reads the pending flash message, if any. The caller is responsible for
/// attaching `clear_cookie()` to the response that consumed it.
pub fn take(req: &HttpRequest) -> Option<Flash> {
    req.cookie(FLASH_COOKIE)
        .and_then(|cookie| Flash::from_code(cookie.value()))
}

pub fn clear_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(FLASH_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// 303 redirect carrying a flash message for the next page load.
pub fn redirect(location: &str, flash: Flash) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(flash.cookie())
        .finish()
}

/// 303 redirect without a flash message.
pub fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
