//! Seed the default accounts.
//!
//! Creates `admin` / `admin123` (admin) and `user` / `user123` (user).
//! Accounts that already exist are left untouched, so the command can run
//! on every deploy.

use homebase_bills::services::auth::{AuthError, AuthService};
use homebase_core::Role;
use sqlx::SqlitePool;

use super::{CommandError, connect};

/// Accounts created by `hb-cli seed`.
pub const DEFAULT_ACCOUNTS: [(&str, &str, Role); 2] = [
    ("admin", "admin123", Role::Admin),
    ("user", "user123", Role::User),
];

/// Migrate, then create any missing default account.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    homebase_bills::db::migrate(&pool).await?;

    let created = seed_accounts(&pool).await?;
    tracing::info!(created, "Seeding complete");
    Ok(())
}

/// Create missing default accounts; returns how many were created.
async fn seed_accounts(pool: &SqlitePool) -> Result<usize, CommandError> {
    let auth = AuthService::new(pool);
    let mut created = 0;

    for (username, password, role) in DEFAULT_ACCOUNTS {
        match auth.create_user(username, password, role).await {
            Ok(user) => {
                created += 1;
                tracing::info!(user_id = %user.id, "Created {} account '{}'", role, username);
            }
            Err(AuthError::UserAlreadyExists) => {
                tracing::info!("Account '{}' already exists, skipping", username);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(created)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let pool = homebase_bills::db::create_pool(&SecretString::from("sqlite::memory:"))
            .await
            .unwrap();
        homebase_bills::db::migrate(&pool).await.unwrap();

        assert_eq!(seed_accounts(&pool).await.unwrap(), 2);
        assert_eq!(seed_accounts(&pool).await.unwrap(), 0);

        let admin = AuthService::new(&pool).login("admin", "admin123").await.unwrap();
        assert_eq!(admin.role, Role::Admin);
        let user = AuthService::new(&pool).login("user", "user123").await.unwrap();
        assert_eq!(user.role, Role::User);
    }
}
