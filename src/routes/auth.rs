use actix_web::http::header;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::auth::session::{self, SessionKeys};
use crate::auth::{hash_password, verify_password, LoginForm, RegisterForm};
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::models::User;
use crate::routes::render;

/// Login entry point. Already-authenticated visitors are sent straight to
/// the dashboard; everyone else gets the login view payload.
#[get("/")]
pub async fn root(req: HttpRequest, keys: web::Data<SessionKeys>) -> impl Responder {
    login_entry(&req, &keys)
}

#[get("/login")]
pub async fn login_page(req: HttpRequest, keys: web::Data<SessionKeys>) -> impl Responder {
    login_entry(&req, &keys)
}

fn login_entry(req: &HttpRequest, keys: &SessionKeys) -> HttpResponse {
    if session::session_user_id(req, keys).is_some() {
        return flash::redirect_to("/dashboard");
    }
    render(req, "login", json!({}))
}

/// Authenticate with a username and password.
///
/// An unknown username and a password mismatch are deliberately
/// indistinguishable: both land back on the login page without a session.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    keys: web::Data<SessionKeys>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, role FROM users WHERE username = $1",
    )
    .bind(&form.username)
    .fetch_optional(&**pool)
    .await?;

    let user = match user {
        Some(user) => user,
        None => return Err(AppError::InvalidCredentials),
    };
    if !verify_password(&form.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = keys.issue(user.id)?;
    log::info!("user {} logged in", user.username);

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/dashboard"))
        .cookie(session::session_cookie(token))
        .cookie(Flash::LoggedIn.cookie())
        .finish())
}

/// Destroy the session. Idempotent: the removal cookie is sent whether or
/// not a live session was attached.
#[post("/logout")]
pub async fn logout() -> impl Responder {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .cookie(session::clear_session_cookie())
        .cookie(Flash::LoggedOut.cookie())
        .finish()
}

#[get("/register")]
pub async fn register_page(req: HttpRequest) -> impl Responder {
    render(&req, "register", json!({}))
}

/// Create a user account.
///
/// New accounts always get the `user` role; admins are provisioned
/// operationally. Duplicate usernames fail, never overwrite.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    form: web::Form<RegisterForm>,
) -> Result<impl Responder, AppError> {
    if form.validate().is_err() {
        return Ok(flash::redirect("/register", Flash::InvalidRegistration));
    }

    let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE username = $1")
        .bind(&form.username)
        .fetch_optional(&**pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::DuplicateUsername(form.username.clone()));
    }

    let password_hash = hash_password(&form.password)?;
    sqlx::query("INSERT INTO users (username, password_hash) VALUES ($1, $2)")
        .bind(&form.username)
        .bind(&password_hash)
        .execute(&**pool)
        .await?;

    log::info!("registered user {}", form.username);
    Ok(flash::redirect("/login", Flash::Registered))
}
