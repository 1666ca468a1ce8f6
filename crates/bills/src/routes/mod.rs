//! HTTP route handlers for the bill tracker.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Home page (honours legacy ?page=<name>)
//! GET  /health                   - Liveness check
//! GET  /health/ready             - Readiness check (database)
//!
//! # Auth
//! GET  /login                    - Login page
//! POST /login                    - Login action
//! GET  /register                 - Register page
//! POST /register                 - Register action
//! GET  /logout, POST /logout     - Logout action
//!
//! # Bills (requires auth)
//! GET  /dashboard                - Statistics over visible bills
//! GET  /bills                    - Filterable bill list (?category, ?status, ?search, ?edit)
//! POST /bills                    - add / edit / delete (form field `action`)
//! POST /api/bills/toggle-status  - Flip paid/unpaid (JSON)
//!
//! # Admin (requires admin role)
//! GET  /admin                    - Users with bill statistics
//! POST /admin                    - update_role / delete_user / add_user
//! ```

pub mod admin;
pub mod api;
pub mod auth;
pub mod bills;
pub mod dashboard;
pub mod health;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout).post(auth::logout))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/bills/toggle-status", post(api::bills::toggle_status))
}

/// Create all routes for the bill tracker.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(auth_routes())
        .route("/dashboard", get(dashboard::show))
        .route("/bills", get(bills::index).post(bills::action))
        .route("/admin", get(admin::index).post(admin::action))
        .nest("/api", api_routes())
}
