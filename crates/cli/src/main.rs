//! Homebase CLI - database, account and planner tools.
//!
//! # Usage
//!
//! ```bash
//! # Run bill tracker migrations
//! hb-cli migrate
//!
//! # Create the default admin/admin123 and user/user123 accounts
//! hb-cli seed
//!
//! # Create an account
//! hb-cli user create -u alice -p secret1 -r admin
//!
//! # Planner
//! hb-cli planner tasks add "Pay rent" --priority high --due 2025-03-01
//! hb-cli planner expenses summary
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run bill tracker database migrations
//! - `seed` - Create the default accounts if missing
//! - `user create` - Create a bill tracker account
//! - `planner` - Tasks, workouts, watchlist and expenses in a local data directory

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use homebase_core::Role;

mod commands;

use commands::CommandError;
use commands::planner::PlannerCommand;

#[derive(Parser)]
#[command(name = "hb-cli")]
#[command(author, version, about = "Homebase CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run bill tracker database migrations
    Migrate,
    /// Create the default admin and user accounts if they do not exist
    Seed,
    /// Manage bill tracker accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Personal planner stored in a local data directory
    Planner {
        /// Directory holding the planner's JSON files
        #[arg(long, global = true, env = "HOMEBASE_PLANNER_DIR")]
        data_dir: Option<PathBuf>,

        #[command(subcommand)]
        command: PlannerCommand,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Account role (`admin` or `user`)
        #[arg(short, long, default_value = "user")]
        role: Role,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hb_cli=info,homebase_bills=info,homebase_planner=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Load .env before clap reads `env = ...` arguments
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                password,
                role,
            } => {
                commands::user::create(&username, &password, role).await?;
            }
        },
        Commands::Planner { data_dir, command } => {
            commands::planner::run(data_dir, command)?;
        }
    }
    Ok(())
}
