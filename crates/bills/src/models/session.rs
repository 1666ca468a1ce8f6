//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use homebase_core::{Role, UserId, Username};

use super::bill::BillScope;
use super::user::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. The
/// auth extractors refresh it from the `users` table on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's login name.
    pub username: Username,
    /// Role as of the current request.
    pub role: Role,
}

impl CurrentUser {
    /// Whether this user has administrative access.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Which bills this user may see and change.
    #[must_use]
    pub const fn scope(&self) -> BillScope {
        if self.is_admin() {
            BillScope::All
        } else {
            BillScope::Owner(self.id)
        }
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: UserId::new(7),
            username: Username::parse("sam").unwrap(),
            role,
        }
    }

    #[test]
    fn test_scope_follows_role() {
        assert_eq!(user(Role::Admin).scope(), BillScope::All);
        assert_eq!(user(Role::User).scope(), BillScope::Owner(UserId::new(7)));
    }

    #[test]
    fn test_session_json_shape() {
        let json = serde_json::to_value(user(Role::User)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "username": "sam", "role": "user"})
        );
    }
}
