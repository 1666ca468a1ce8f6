//! Database operations for the bill tracker.
//!
//! # Database: `SQLite`
//!
//! ## Tables
//!
//! - `users` - Accounts with argon2 password hashes and a role
//! - `bills` - Bills owned by a user (`ON DELETE CASCADE`)
//! - `tower_sessions` - Session storage, created by the session store
//!
//! # Migrations
//!
//! Migrations are stored in `crates/bills/migrations/` and run via:
//! ```bash
//! cargo run -p homebase-cli -- migrate
//! ```
//! or at startup when `BILLS_AUTO_MIGRATE=true`.

pub mod bills;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use bills::BillRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found (or is not visible to the caller).
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with foreign keys enforced.
///
/// In-memory databases get a single connection that never expires, since each
/// `SQLite` connection to `:memory:` is its own database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let url = database_url.expose_secret();
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
    };

    pool_options.connect_with(options).await
}

/// Run the embedded bill tracker migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

#[cfg(test)]
pub(crate) mod test_support {
    use secrecy::SecretString;
    use sqlx::SqlitePool;

    /// Fresh in-memory database with migrations applied.
    #[allow(clippy::unwrap_used)]
    pub async fn pool() -> SqlitePool {
        let pool = super::create_pool(&SecretString::from("sqlite::memory:"))
            .await
            .unwrap();
        super::migrate(&pool).await.unwrap();
        pool
    }
}
