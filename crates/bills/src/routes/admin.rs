//! Admin panel route handlers (admin role only).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use thiserror::Error;

use homebase_core::{Role, UserId};

use crate::db::{RepositoryError, UserRepository};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{CurrentUser, UserStats};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// A user row in the admin table.
#[derive(Debug, Clone)]
pub struct UserRowView {
    pub id: i64,
    pub username: String,
    /// `admin` or `user`.
    pub role: String,
    pub role_label: &'static str,
    pub bill_count: i64,
    pub total_amount: String,
    pub unpaid_count: i64,
    /// Whether this row is the signed-in admin.
    pub is_self: bool,
}

impl UserRowView {
    fn new(stats: &UserStats, current: UserId) -> Self {
        Self {
            id: stats.user.id.as_i64(),
            username: stats.user.username.to_string(),
            role: stats.user.role.to_string(),
            role_label: stats.user.role.label(),
            bill_count: stats.bill_count,
            total_amount: stats.total_amount.to_string(),
            unpaid_count: stats.unpaid_count,
            is_self: stats.user.id == current,
        }
    }
}

// =============================================================================
// Query / Form Types
// =============================================================================

/// Flash codes passed back after an action.
#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Admin form submission (`action` = `update_role`, `delete_user` or `add_user`).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminForm {
    pub action: String,
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub username: String,
    pub password: String,
}

/// Reasons an admin action fails.
#[derive(Debug, Error)]
pub enum AdminActionError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("missing or invalid user id")]
    MissingId,
    #[error("invalid role")]
    InvalidRole,
    #[error("admins cannot change or delete their own account")]
    SelfTarget,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AdminActionError {
    /// Flash code for the `?error=` query parameter.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownAction(_) | Self::MissingId | Self::InvalidRole => "invalid",
            Self::SelfTarget => "self",
            Self::Auth(err) => err.code(),
            Self::Repository(RepositoryError::NotFound) => "not_found",
            Self::Repository(_) => "server",
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Admin panel template.
#[derive(Template, WebTemplate)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub current_user: Option<CurrentUser>,
    pub users: Vec<UserRowView>,
    pub success: Option<&'static str>,
    pub error: Option<&'static str>,
}

fn success_message(code: &str) -> &'static str {
    match code {
        "role_updated" => "Role updated",
        "user_deleted" => "User deleted",
        "user_added" => "User added",
        _ => "Saved",
    }
}

fn error_message(code: &str) -> &'static str {
    match code {
        "self" => "You cannot change or delete your own account",
        "not_found" => "User not found",
        "username_taken" => "Username already exists",
        "weak_password" => "Password must be at least 6 characters long",
        "invalid_username" => "Username must be 1-50 characters without control characters",
        "server" => "Something went wrong. Please try again.",
        _ => "Invalid request",
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display all users with their bill statistics.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<AdminQuery>,
) -> Result<impl IntoResponse> {
    let stats = UserRepository::new(state.pool()).list_with_stats().await?;

    Ok(AdminTemplate {
        users: stats.iter().map(|s| UserRowView::new(s, admin.id)).collect(),
        success: query.success.as_deref().map(success_message),
        error: query.error.as_deref().map(error_message),
        current_user: Some(admin),
    })
}

/// Handle user management submissions.
pub async fn action(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<AdminForm>,
) -> Redirect {
    match apply_action(&state, &admin, &form).await {
        Ok(code) => Redirect::to(&format!("/admin?success={code}")),
        Err(e) => {
            if matches!(
                e,
                AdminActionError::Repository(RepositoryError::Database(_))
                    | AdminActionError::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
            ) {
                tracing::error!(admin_id = %admin.id, action = %form.action, "Admin action failed: {}", e);
            } else {
                tracing::warn!(admin_id = %admin.id, action = %form.action, "Admin action rejected: {}", e);
            }
            Redirect::to(&format!("/admin?error={}", e.code()))
        }
    }
}

/// Parse the target user id, refusing the admin's own account.
fn target_user(raw: Option<&str>, admin: &CurrentUser) -> std::result::Result<UserId, AdminActionError> {
    let id = raw
        .and_then(|id| id.trim().parse::<UserId>().ok())
        .ok_or(AdminActionError::MissingId)?;
    if id == admin.id {
        return Err(AdminActionError::SelfTarget);
    }
    Ok(id)
}

fn parse_role(raw: Option<&str>) -> std::result::Result<Role, AdminActionError> {
    raw.and_then(|r| r.parse::<Role>().ok())
        .ok_or(AdminActionError::InvalidRole)
}

async fn apply_action(
    state: &AppState,
    admin: &CurrentUser,
    form: &AdminForm,
) -> std::result::Result<&'static str, AdminActionError> {
    let users = UserRepository::new(state.pool());

    match form.action.as_str() {
        "update_role" => {
            let id = target_user(form.user_id.as_deref(), admin)?;
            let role = parse_role(form.role.as_deref())?;
            users.update_role(id, role).await?;
            let (user_id, role_name) = (id.to_string(), role.to_string());
            add_breadcrumb(
                "admin",
                "Updated role",
                Some(&[("user_id", user_id.as_str()), ("role", role_name.as_str())]),
            );
            Ok("role_updated")
        }
        "delete_user" => {
            let id = target_user(form.user_id.as_deref(), admin)?;
            users.delete(id).await?;
            let user_id = id.to_string();
            add_breadcrumb("admin", "Deleted user", Some(&[("user_id", user_id.as_str())]));
            tracing::info!(admin_id = %admin.id, user_id = %id, "User deleted");
            Ok("user_deleted")
        }
        "add_user" => {
            let role = parse_role(form.role.as_deref().or(Some("user")))?;
            let user = AuthService::new(state.pool())
                .create_user(&form.username, &form.password, role)
                .await?;
            let user_id = user.id.to_string();
            add_breadcrumb("admin", "Added user", Some(&[("user_id", user_id.as_str())]));
            Ok("user_added")
        }
        other => Err(AdminActionError::UnknownAction(other.to_owned())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use homebase_core::Username;

    use super::*;

    fn admin() -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            username: Username::parse("admin").unwrap(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_target_user_refuses_self() {
        let admin = admin();
        assert!(matches!(
            target_user(Some("1"), &admin),
            Err(AdminActionError::SelfTarget)
        ));
        assert!(matches!(target_user(Some("2"), &admin), Ok(id) if id == UserId::new(2)));
        assert!(matches!(
            target_user(Some("abc"), &admin),
            Err(AdminActionError::MissingId)
        ));
        assert!(matches!(target_user(None, &admin), Err(AdminActionError::MissingId)));
    }

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role(Some("admin")).unwrap(), Role::Admin);
        assert_eq!(parse_role(Some("user")).unwrap(), Role::User);
        assert!(matches!(parse_role(Some("root")), Err(AdminActionError::InvalidRole)));
    }

    #[test]
    fn test_error_codes_have_messages() {
        assert_eq!(
            error_message(AdminActionError::SelfTarget.code()),
            "You cannot change or delete your own account"
        );
        assert_eq!(
            error_message(AdminActionError::Auth(AuthError::UserAlreadyExists).code()),
            "Username already exists"
        );
        assert_eq!(
            error_message(AdminActionError::Repository(RepositoryError::NotFound).code()),
            "User not found"
        );
    }
}
