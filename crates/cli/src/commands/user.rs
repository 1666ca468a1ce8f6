//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! hb-cli user create -u alice -p secret1 -r admin
//! ```
//!
//! # Environment Variables
//!
//! - `BILLS_DATABASE_URL` - `SQLite` connection string

use homebase_bills::services::auth::AuthService;
use homebase_core::{Role, UserId};

use super::{CommandError, connect};

/// Create a new account.
///
/// Uses the same validation as web registration.
///
/// # Errors
///
/// Returns `CommandError::Auth` for invalid input or a taken username.
pub async fn create(username: &str, password: &str, role: Role) -> Result<UserId, CommandError> {
    let pool = connect().await?;

    tracing::info!("Creating {} account: {}", role, username);
    let user = AuthService::new(&pool)
        .create_user(username, password, role)
        .await?;

    tracing::info!(
        "Account created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );
    Ok(user.id)
}
