//! Bill domain types and input validation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use homebase_core::{BillId, BillStatus, Money, MoneyError, UserId};

/// Categories offered by the bill form.
///
/// Stored categories are free text, so bills with other labels still list
/// and filter normally.
pub const BILL_CATEGORIES: &[&str] = &[
    "Utilities",
    "Housing",
    "Transportation",
    "Insurance",
    "Healthcare",
    "Entertainment",
    "Other",
];

const MAX_TITLE_LENGTH: usize = 100;
const MAX_CATEGORY_LENGTH: usize = 50;

/// A bill (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bill {
    pub id: BillId,
    /// Owner of the bill.
    pub user_id: UserId,
    pub title: String,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub category: String,
    pub status: BillStatus,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status == BillStatus::Paid
    }

    /// Unpaid and due strictly before `today`.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_paid() && self.due_date < today
    }
}

/// Which bills a caller may see and modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillScope {
    /// Every bill (admins).
    All,
    /// Only bills owned by this user.
    Owner(UserId),
}

impl BillScope {
    /// Owner restriction as a nullable bind parameter (`NULL` = no restriction).
    #[must_use]
    pub const fn owner(self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Owner(id) => Some(id.as_i64()),
        }
    }
}

/// List filters for the bills page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillFilter {
    /// Exact category; `None` matches every category.
    pub category: Option<String>,
    /// Exact status; `None` matches both.
    pub status: Option<BillStatus>,
    /// Case-insensitive substring of title or category.
    pub search: Option<String>,
}

impl BillFilter {
    /// Build a filter from raw query parameters.
    ///
    /// `"All"`, empty values and unknown statuses mean "no filter".
    #[must_use]
    pub fn from_params(category: Option<&str>, status: Option<&str>, search: Option<&str>) -> Self {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "All")
            .map(str::to_owned);
        let status = status.and_then(|s| s.trim().parse().ok());
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        Self {
            category,
            status,
            search,
        }
    }
}

/// Reasons a submitted bill is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillDraftError {
    #[error("title must be 1-100 characters")]
    Title,
    #[error("invalid amount: {0}")]
    Amount(#[from] MoneyError),
    #[error("amount must be greater than zero")]
    ZeroAmount,
    #[error("due date must be YYYY-MM-DD")]
    DueDate,
    #[error("category must be 1-50 characters")]
    Category,
    #[error("status must be paid or unpaid")]
    Status,
}

/// Validated fields for creating or updating a bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillDraft {
    pub title: String,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub category: String,
    pub status: BillStatus,
}

impl BillDraft {
    /// Validate raw form values.
    ///
    /// A missing status defaults to `unpaid`.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn parse(
        title: &str,
        amount: &str,
        due_date: &str,
        category: &str,
        status: Option<&str>,
    ) -> Result<Self, BillDraftError> {
        let title = title.trim();
        if title.is_empty() || title.chars().count() > MAX_TITLE_LENGTH {
            return Err(BillDraftError::Title);
        }

        let amount = Money::parse(amount)?;
        if amount.is_zero() {
            return Err(BillDraftError::ZeroAmount);
        }

        let due_date = NaiveDate::parse_from_str(due_date.trim(), "%Y-%m-%d")
            .map_err(|_| BillDraftError::DueDate)?;

        let category = category.trim();
        if category.is_empty() || category.chars().count() > MAX_CATEGORY_LENGTH {
            return Err(BillDraftError::Category);
        }

        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s.parse().map_err(|_| BillDraftError::Status)?,
            None => BillStatus::Unpaid,
        };

        Ok(Self {
            title: title.to_owned(),
            amount,
            due_date,
            category: category.to_owned(),
            status,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_draft() {
        let draft = BillDraft::parse(" Rent ", "1200.5", "2025-03-01", "Housing", None).unwrap();
        assert_eq!(draft.title, "Rent");
        assert_eq!(draft.amount.cents(), 120_050);
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(draft.status, BillStatus::Unpaid);

        let paid = BillDraft::parse("Gym", "30", "2025-03-01", "Other", Some("paid")).unwrap();
        assert_eq!(paid.status, BillStatus::Paid);
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        let ok = ("Rent", "10", "2025-03-01", "Housing");
        assert_eq!(
            BillDraft::parse("  ", ok.1, ok.2, ok.3, None),
            Err(BillDraftError::Title)
        );
        assert_eq!(
            BillDraft::parse(&"t".repeat(101), ok.1, ok.2, ok.3, None),
            Err(BillDraftError::Title)
        );
        assert_eq!(
            BillDraft::parse(ok.0, "0", ok.2, ok.3, None),
            Err(BillDraftError::ZeroAmount)
        );
        assert_eq!(
            BillDraft::parse(ok.0, "-5", ok.2, ok.3, None),
            Err(BillDraftError::Amount(MoneyError::Negative))
        );
        assert_eq!(
            BillDraft::parse(ok.0, "1.001", ok.2, ok.3, None),
            Err(BillDraftError::Amount(MoneyError::TooPrecise))
        );
        assert_eq!(
            BillDraft::parse(ok.0, ok.1, "03/01/2025", ok.3, None),
            Err(BillDraftError::DueDate)
        );
        assert_eq!(
            BillDraft::parse(ok.0, ok.1, ok.2, "", None),
            Err(BillDraftError::Category)
        );
        assert_eq!(
            BillDraft::parse(ok.0, ok.1, ok.2, ok.3, Some("late")),
            Err(BillDraftError::Status)
        );
    }

    #[test]
    fn test_filter_from_params() {
        let filter = BillFilter::from_params(Some("All"), Some("All"), Some("  "));
        assert_eq!(filter, BillFilter::default());

        let filter = BillFilter::from_params(Some("Housing"), Some("paid"), Some(" rent "));
        assert_eq!(filter.category.as_deref(), Some("Housing"));
        assert_eq!(filter.status, Some(BillStatus::Paid));
        assert_eq!(filter.search.as_deref(), Some("rent"));
    }

    #[test]
    fn test_overdue() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let mut bill = Bill {
            id: BillId::new(1),
            user_id: UserId::new(1),
            title: "Power".to_string(),
            amount: Money::from_cents(5000),
            due_date: NaiveDate::from_ymd_opt(2025, 5, 9).unwrap(),
            category: "Utilities".to_string(),
            status: BillStatus::Unpaid,
            created_at: Utc::now(),
        };
        assert!(bill.is_overdue(today));

        bill.due_date = today;
        assert!(!bill.is_overdue(today));

        bill.due_date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        bill.status = BillStatus::Paid;
        assert!(!bill.is_overdue(today));
    }
}
