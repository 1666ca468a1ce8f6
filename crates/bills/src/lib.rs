//! Homebase bill tracker library.
//!
//! Server-rendered bill tracking with username/password accounts, an
//! admin/user role split and per-user bill visibility. Exposed as a library
//! so the binary, the CLI and the integration tests share one router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    http::{HeaderValue, header::CACHE_CONTROL},
    middleware::from_fn,
};
use tower::ServiceBuilder;
use tower_http::{
    services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::state::AppState;

/// Build the full application router with its middleware stack.
///
/// Sentry layers are not included; the binary adds them outermost.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session table cannot be created.
pub async fn build_router(state: AppState) -> Result<Router, sqlx::Error> {
    let session_layer = middleware::create_session_layer(state.pool(), state.config()).await?;

    let static_files = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        ))
        .service(ServeDir::new(&state.config().static_dir));

    Ok(Router::new()
        .merge(routes::routes())
        .nest_service("/static", static_files)
        .layer(session_layer)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state))
}
