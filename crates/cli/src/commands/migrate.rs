//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! hb-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `BILLS_DATABASE_URL` - `SQLite` connection string (falls back to `DATABASE_URL`)
//!
//! Migration files live in `crates/bills/migrations/`.

use super::{CommandError, connect};

/// Run bill tracker database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running bill tracker migrations...");
    homebase_bills::db::migrate(&pool).await?;

    tracing::info!("Bill tracker migrations complete!");
    Ok(())
}
