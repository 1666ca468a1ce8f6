//! Command implementations.

pub mod migrate;
pub mod planner;
pub mod seed;
pub mod user;

use homebase_bills::config::{BillsConfig, ConfigError};
use homebase_bills::services::auth::AuthError;
use homebase_planner::PlannerError;
use sqlx::SqlitePool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Environment configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Account creation failed.
    #[error("Account error: {0}")]
    Auth(#[from] AuthError),

    /// Planner operation failed.
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    /// No usable planner data directory.
    #[error("No data directory found; pass --data-dir")]
    NoDataDir,

    /// A workout command needs a session in progress.
    #[error("No workout in progress; run `planner workouts start` first")]
    NoActiveWorkout,

    /// Only one workout can run at a time.
    #[error("Workout already in progress: {0}")]
    WorkoutInProgress(String),
}

/// Connect to the bill tracker database from `BILLS_DATABASE_URL`.
async fn connect() -> Result<SqlitePool, CommandError> {
    let config = BillsConfig::from_env()?;
    tracing::info!("Connecting to bill tracker database...");
    Ok(homebase_bills::db::create_pool(&config.database_url).await?)
}
