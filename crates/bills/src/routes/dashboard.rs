//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};

use crate::db::BillRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{BillFilter, CurrentUser};
use crate::routes::bills::BillView;
use crate::services::summary::{CategoryTotal, DashboardSummary};
use crate::state::AppState;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub current_user: Option<CurrentUser>,
    pub username: String,
    pub total_count: usize,
    pub total_amount: String,
    pub paid_total: String,
    pub unpaid_total: String,
    pub paid_percent: u32,
    pub unpaid_count: usize,
    pub overdue_count: usize,
    pub upcoming: Vec<BillView>,
    pub categories: Vec<CategoryTotal>,
}

/// Display statistics over the bills visible to the current user.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let bills = BillRepository::new(state.pool())
        .list(user.scope(), &BillFilter::default())
        .await?;
    let today = chrono::Local::now().date_naive();
    let summary = DashboardSummary::compute(&bills, today);

    Ok(DashboardTemplate {
        username: user.username.to_string(),
        total_count: summary.total_count,
        total_amount: summary.total_amount.to_string(),
        paid_total: summary.paid_total.to_string(),
        unpaid_total: summary.unpaid_total.to_string(),
        paid_percent: summary.paid_percent,
        unpaid_count: summary.unpaid_count,
        overdue_count: summary.overdue_count,
        upcoming: summary
            .upcoming
            .iter()
            .map(|b| BillView::new(b, today))
            .collect(),
        categories: summary.categories,
        current_user: Some(user),
    })
}
