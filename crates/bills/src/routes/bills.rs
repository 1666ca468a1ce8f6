//! Bill list and bill form route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use homebase_core::{BillId, BillStatus};

use crate::db::{BillRepository, RepositoryError};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{BILL_CATEGORIES, Bill, BillDraft, BillDraftError, BillFilter, CurrentUser};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// A bill prepared for display.
#[derive(Debug, Clone)]
pub struct BillView {
    pub id: i64,
    pub title: String,
    /// Formatted amount, e.g. `$1,250.00`.
    pub amount: String,
    /// Amount for pre-filling an input, e.g. `1250.00`.
    pub amount_input: String,
    /// ISO date, e.g. `2025-03-01`.
    pub due_date: String,
    pub category: String,
    /// `paid` or `unpaid`.
    pub status: &'static str,
    pub status_label: &'static str,
    pub is_paid: bool,
    pub is_overdue: bool,
}

impl BillView {
    #[must_use]
    pub fn new(bill: &Bill, today: NaiveDate) -> Self {
        Self {
            id: bill.id.as_i64(),
            title: bill.title.clone(),
            amount: bill.amount.to_string(),
            amount_input: bill.amount.to_plain_string(),
            due_date: bill.due_date.format("%Y-%m-%d").to_string(),
            category: bill.category.clone(),
            status: bill.status.as_str(),
            status_label: bill.status.label(),
            is_paid: bill.is_paid(),
            is_overdue: bill.is_overdue(today),
        }
    }
}

/// An `<option>` in a select box.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: &str, label: &str, current: Option<&str>) -> Self {
        Self {
            value: value.to_owned(),
            label: label.to_owned(),
            selected: current == Some(value),
        }
    }
}

// =============================================================================
// Query / Form Types
// =============================================================================

/// Query parameters for the bill list.
#[derive(Debug, Default, Deserialize)]
pub struct BillsQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    /// Bill to load into the form.
    pub edit: Option<String>,
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Bill form submission (`action` = `add`, `edit` or `delete`).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BillForm {
    pub action: String,
    pub bill_id: Option<String>,
    pub title: String,
    pub amount: String,
    pub due_date: String,
    pub category: String,
    pub status: Option<String>,
}

/// Reasons a bill form submission fails.
#[derive(Debug, Error)]
pub enum BillActionError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("missing or invalid bill id")]
    MissingId,
    #[error("invalid bill: {0}")]
    Invalid(#[from] BillDraftError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// =============================================================================
// Templates
// =============================================================================

/// Bills page template.
#[derive(Template, WebTemplate)]
#[template(path = "bills.html")]
pub struct BillsTemplate {
    pub current_user: Option<CurrentUser>,
    pub bills: Vec<BillView>,
    pub search: String,
    pub category_options: Vec<SelectOption>,
    pub status_options: Vec<SelectOption>,
    pub success: bool,
    pub error: bool,
    /// Bill being edited, if any.
    pub editing: Option<BillView>,
    pub form_categories: Vec<SelectOption>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the filtered bill list and the add/edit form.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<BillsQuery>,
) -> Result<impl IntoResponse> {
    let repo = BillRepository::new(state.pool());
    let scope = user.scope();
    let today = chrono::Local::now().date_naive();

    let filter = BillFilter::from_params(
        query.category.as_deref(),
        query.status.as_deref(),
        query.search.as_deref(),
    );
    let bills = repo.list(scope, &filter).await?;
    let categories = repo.categories(scope).await?;

    let editing = match query.edit.as_deref().and_then(|id| id.parse::<BillId>().ok()) {
        Some(id) => repo.get(scope, id).await?.map(|b| BillView::new(&b, today)),
        None => None,
    };

    let selected_category = filter.category.as_deref().unwrap_or("All");
    let mut category_options = vec![SelectOption::new("All", "All Categories", Some(selected_category))];
    category_options.extend(
        categories
            .iter()
            .map(|c| SelectOption::new(c, c, Some(selected_category))),
    );

    let selected_status = filter.status.map_or("All", BillStatus::as_str);
    let status_options = vec![
        SelectOption::new("All", "All Statuses", Some(selected_status)),
        SelectOption::new("paid", "Paid", Some(selected_status)),
        SelectOption::new("unpaid", "Unpaid", Some(selected_status)),
    ];

    let editing_category = editing.as_ref().map(|b| b.category.as_str());
    let mut form_categories: Vec<SelectOption> = BILL_CATEGORIES
        .iter()
        .map(|c| SelectOption::new(c, c, editing_category))
        .collect();
    if let Some(category) = editing_category
        && !BILL_CATEGORIES.contains(&category)
    {
        form_categories.push(SelectOption::new(category, category, Some(category)));
    }

    Ok(BillsTemplate {
        current_user: Some(user),
        bills: bills.iter().map(|b| BillView::new(b, today)).collect(),
        search: filter.search.unwrap_or_default(),
        category_options,
        status_options,
        success: query.success.is_some(),
        error: query.error.is_some(),
        editing,
        form_categories,
    })
}

/// Handle add / edit / delete submissions.
///
/// Always redirects back to the list with `?success=1` or `?error=1`.
pub async fn action(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<BillForm>,
) -> Redirect {
    match apply_action(&state, &user, &form).await {
        Ok(()) => Redirect::to("/bills?success=1"),
        Err(BillActionError::Repository(e @ RepositoryError::Database(_))) => {
            tracing::error!(user_id = %user.id, action = %form.action, "Bill action failed: {}", e);
            Redirect::to("/bills?error=1")
        }
        Err(e) => {
            tracing::warn!(user_id = %user.id, action = %form.action, "Bill action rejected: {}", e);
            Redirect::to("/bills?error=1")
        }
    }
}

fn parse_bill_id(raw: Option<&str>) -> std::result::Result<BillId, BillActionError> {
    raw.and_then(|id| id.parse::<BillId>().ok())
        .ok_or(BillActionError::MissingId)
}

fn parse_draft(form: &BillForm) -> std::result::Result<BillDraft, BillDraftError> {
    BillDraft::parse(
        &form.title,
        &form.amount,
        &form.due_date,
        &form.category,
        form.status.as_deref(),
    )
}

async fn apply_action(
    state: &AppState,
    user: &CurrentUser,
    form: &BillForm,
) -> std::result::Result<(), BillActionError> {
    let repo = BillRepository::new(state.pool());

    match form.action.as_str() {
        "add" => {
            let draft = parse_draft(form)?;
            let bill = repo.create(user.id, &draft).await?;
            let bill_id = bill.id.to_string();
            add_breadcrumb("bills", "Added bill", Some(&[("bill_id", bill_id.as_str())]));
        }
        "edit" => {
            let id = parse_bill_id(form.bill_id.as_deref())?;
            let draft = parse_draft(form)?;
            repo.update(user.scope(), id, &draft).await?;
            let bill_id = id.to_string();
            add_breadcrumb("bills", "Edited bill", Some(&[("bill_id", bill_id.as_str())]));
        }
        "delete" => {
            let id = parse_bill_id(form.bill_id.as_deref())?;
            repo.delete(user.scope(), id).await?;
            let bill_id = id.to_string();
            add_breadcrumb("bills", "Deleted bill", Some(&[("bill_id", bill_id.as_str())]));
        }
        other => return Err(BillActionError::UnknownAction(other.to_owned())),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bill_id() {
        assert!(matches!(parse_bill_id(Some("12")), Ok(id) if id == BillId::new(12)));
        assert!(matches!(parse_bill_id(Some("")), Err(BillActionError::MissingId)));
        assert!(matches!(parse_bill_id(Some("x")), Err(BillActionError::MissingId)));
        assert!(matches!(parse_bill_id(None), Err(BillActionError::MissingId)));
    }

    #[test]
    fn test_select_option_marks_current() {
        let option = SelectOption::new("paid", "Paid", Some("paid"));
        assert!(option.selected);
        let option = SelectOption::new("paid", "Paid", Some("All"));
        assert!(!option.selected);
    }
}
