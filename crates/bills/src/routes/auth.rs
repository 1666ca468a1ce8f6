//! Authentication route handlers.
//!
//! Handles login, registration and logout with username/password accounts.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<&'static str>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<&'static str>,
}

/// Message for a `?error=` code on the login page.
///
/// Every credential failure maps to the same text.
fn login_error_message(code: &str) -> &'static str {
    match code {
        "session" | "server" => "Something went wrong. Please try again.",
        _ => "Invalid username or password",
    }
}

/// Message for a `?error=` code on the register page.
fn register_error_message(code: &str) -> &'static str {
    match code {
        "password_mismatch" => "Passwords do not match",
        "weak_password" => "Password must be at least 6 characters long",
        "invalid_username" => "Username must be 1-50 characters without control characters",
        "username_taken" => "Username already exists",
        _ => "Something went wrong. Please try again.",
    }
}

/// Store `user` in a fresh session.
async fn start_session(session: &Session, user: User) -> Result<(), tower_sessions::session::Error> {
    let current = CurrentUser::from(user);
    set_current_user(session, &current).await?;
    set_sentry_user(&current.id, Some(current.username.as_str()));
    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if current_user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    LoginTemplate {
        current_user,
        error: query.error.as_deref().map(login_error_message),
    }
    .into_response()
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(state.pool());

    match auth.login(form.username.trim(), &form.password).await {
        Ok(user) => {
            let user_id = user.id;
            if let Err(e) = start_session(&session, user).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/login?error=session").into_response();
            }
            tracing::info!(user_id = %user_id, "User logged in");
            Redirect::to("/dashboard").into_response()
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Login failed: invalid credentials");
            Redirect::to("/login?error=invalid_credentials").into_response()
        }
        Err(e) => {
            tracing::error!("Login failed: {}", e);
            Redirect::to("/login?error=server").into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if current_user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    RegisterTemplate {
        current_user,
        error: query.error.as_deref().map(register_error_message),
    }
    .into_response()
}

/// Handle registration form submission.
///
/// A successful registration logs the new user in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let auth = AuthService::new(state.pool());

    match auth
        .register(&form.username, &form.password, &form.confirm_password)
        .await
    {
        Ok(user) => {
            if let Err(e) = start_session(&session, user).await {
                tracing::error!("Failed to set session after registration: {}", e);
                return Redirect::to("/login?error=session").into_response();
            }
            Redirect::to("/dashboard").into_response()
        }
        Err(e) => {
            tracing::warn!("Registration failed: {}", e);
            Redirect::to(&format!("/register?error={}", e.code())).into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout (GET or POST).
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();

    (
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate, max-age=0"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        Redirect::to("/login"),
    )
        .into_response()
}
