//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::Query,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;

/// Query parameters accepted by the home page.
#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    /// Page name from old `index.php?page=<name>` links.
    pub page: Option<String>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_user: Option<CurrentUser>,
}

/// Where a legacy `?page=` name lives now; unknown names fall back to home.
#[must_use]
pub fn legacy_page_path(page: &str) -> Option<&'static str> {
    match page {
        "login" => Some("/login"),
        "register" => Some("/register"),
        "dashboard" => Some("/dashboard"),
        "bills" => Some("/bills"),
        "logout" => Some("/logout"),
        "admin" => Some("/admin"),
        _ => None,
    }
}

/// Display the home page, or forward a legacy `?page=` link.
pub async fn home(
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<HomeQuery>,
) -> Response {
    if let Some(path) = query.page.as_deref().and_then(legacy_page_path) {
        return Redirect::to(path).into_response();
    }

    HomeTemplate { current_user }.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_page_paths() {
        assert_eq!(legacy_page_path("bills"), Some("/bills"));
        assert_eq!(legacy_page_path("admin"), Some("/admin"));
        assert_eq!(legacy_page_path("home"), None);
        assert_eq!(legacy_page_path("../etc/passwd"), None);
    }
}
