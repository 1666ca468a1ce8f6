//! Integration tests for Homebase.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p homebase-integration-tests
//! ```
//!
//! Each test spawns the bill tracker on an ephemeral port over a private
//! in-memory `SQLite` database and talks to it with a cookie-carrying HTTP
//! client, so no external services are needed.
//!
//! # Test Categories
//!
//! - `auth` - Login, logout, registration
//! - `bills` - Bill visibility, edits and the status toggle API
//! - `admin` - User management and its guards
//! - `planner` - Planner collections over a data directory

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use homebase_bills::{
    config::BillsConfig,
    db::BillRepository,
    models::{Bill, BillDraft},
    services::auth::AuthService,
    state::AppState,
};
use homebase_core::{Role, UserId};
use reqwest::{Client, header::LOCATION, redirect::Policy};
use sqlx::SqlitePool;

/// Errors raised while setting up a test server.
pub type SetupError = Box<dyn std::error::Error + Send + Sync>;

/// A running bill tracker with direct access to its database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: SqlitePool,
}

impl TestApp {
    /// Start the bill tracker on `127.0.0.1:0` with a fresh database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database, router or listener cannot be set up.
    pub async fn spawn() -> Result<Self, SetupError> {
        let config = BillsConfig::for_database("sqlite::memory:");
        let pool = homebase_bills::db::create_pool(&config.database_url).await?;
        homebase_bills::db::migrate(&pool).await?;

        let app = homebase_bills::build_router(AppState::new(config, pool.clone())).await?;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, pool })
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Create an account directly through the auth service.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be created.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<UserId, SetupError> {
        let user = AuthService::new(&self.pool)
            .create_user(username, password, role)
            .await?;
        Ok(user.id)
    }

    /// Insert an unpaid bill owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bill cannot be stored.
    pub async fn create_bill(
        &self,
        owner: UserId,
        title: &str,
        amount: &str,
    ) -> Result<Bill, SetupError> {
        let draft = BillDraft::parse(title, amount, "2025-03-01", "Utilities", None)?;
        Ok(BillRepository::new(&self.pool).create(owner, &draft).await?)
    }

    /// A client that keeps cookies and does not follow redirects.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn client() -> Result<Client, SetupError> {
        Ok(Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()?)
    }

    /// A client signed in as `username`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the login is refused.
    pub async fn login(&self, username: &str, password: &str) -> Result<Client, SetupError> {
        let client = Self::client()?;
        let resp = client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        if location(&resp).as_deref() != Some("/dashboard") {
            return Err(format!("login as {username} failed: {}", resp.status()).into());
        }
        Ok(client)
    }
}

/// The `Location` header of a redirect, if any.
#[must_use]
pub fn location(resp: &reqwest::Response) -> Option<String> {
    if !resp.status().is_redirection() {
        return None;
    }
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
