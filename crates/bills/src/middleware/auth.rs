//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in user (and optionally the
//! admin role) in route handlers.
//!
//! The session only remembers who logged in. Every extraction reloads that
//! account from the database, so a role change or an account deletion takes
//! effect on the user's next request.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::{RepositoryError, UserRepository};
use crate::models::{CurrentUser, keys};
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// If the user is not logged in, returns a redirect to the login page
/// (or `401` for `/api/` paths).
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the user is not logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// The account could not be loaded.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                axum::Json(serde_json::json!({
                    "success": false,
                    "message": "Unauthorized",
                })),
            )
                .into_response(),
            Self::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

fn is_api(parts: &Parts) -> bool {
    parts.uri.path().starts_with("/api/")
}

/// Resolve the logged-in user against the `users` table.
///
/// A session whose account no longer exists is flushed. A session whose
/// stored identity is stale (renamed or re-roled) is rewritten in place.
async fn current_user(
    parts: &Parts,
    state: &AppState,
) -> Result<Option<CurrentUser>, RepositoryError> {
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };
    let Some(stored) = session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
    else {
        return Ok(None);
    };

    let Some(user) = UserRepository::new(state.pool()).get_by_id(stored.id).await? else {
        tracing::info!(user_id = %stored.id, "Session refers to a deleted account, logging out");
        if let Err(e) = session.flush().await {
            tracing::error!("Failed to flush session: {}", e);
        }
        return Ok(None);
    };

    let fresh = CurrentUser::from(user);
    if fresh != stored {
        tracing::debug!(user_id = %fresh.id, role = %fresh.role, "Refreshing session identity");
        if let Err(e) = session.insert(keys::CURRENT_USER, &fresh).await {
            tracing::error!("Failed to refresh session: {}", e);
        }
    }

    Ok(Some(fresh))
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let api = is_api(parts);

        match current_user(parts, &state).await {
            Ok(Some(user)) => Ok(Self(user)),
            Ok(None) if api => Err(AuthRejection::Unauthorized),
            Ok(None) => Err(AuthRejection::RedirectToLogin),
            Err(e) => {
                tracing::error!("Failed to load session user: {}", e);
                Err(AuthRejection::Internal)
            }
        }
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if the user is not
/// logged in. A failed account lookup is logged and treated as anonymous.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let user = current_user(parts, &state).await.unwrap_or_else(|e| {
            tracing::error!("Failed to load session user: {}", e);
            None
        });
        Ok(Self(user))
    }
}

/// Extractor that requires a logged-in admin.
///
/// Anonymous requests are rejected like `RequireAuth`. Logged-in users without
/// the admin role are sent back to the dashboard (or get `403` on `/api/` paths).
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when admin access is required.
#[derive(Debug)]
pub enum AdminRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Logged in, but not an admin (HTML requests).
    RedirectToDashboard,
    /// Logged in, but not an admin (API requests).
    Forbidden,
    /// The account could not be loaded.
    Internal,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => AuthRejection::RedirectToLogin.into_response(),
            Self::Unauthorized => AuthRejection::Unauthorized.into_response(),
            Self::RedirectToDashboard => Redirect::to("/dashboard").into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Admin access required").into_response(),
            Self::Internal => AuthRejection::Internal.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AdminRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let api = is_api(parts);

        let user = match current_user(parts, &state).await {
            Ok(Some(user)) => user,
            Ok(None) if api => return Err(AdminRejection::Unauthorized),
            Ok(None) => return Err(AdminRejection::RedirectToLogin),
            Err(e) => {
                tracing::error!("Failed to load session user: {}", e);
                return Err(AdminRejection::Internal);
            }
        };

        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Non-admin denied");
            return Err(if api {
                AdminRejection::Forbidden
            } else {
                AdminRejection::RedirectToDashboard
            });
        }

        Ok(Self(user))
    }
}

/// Log a user in: rotate the session ID, then store the user.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Log the user out by discarding the whole session.
///
/// # Errors
///
/// Returns an error if the session store cannot delete the record.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
