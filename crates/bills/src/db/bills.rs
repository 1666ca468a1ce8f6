//! Bill repository for database operations.
//!
//! Every read and write takes a [`BillScope`]: admins operate on all bills,
//! everyone else only on their own. A bill outside the scope behaves exactly
//! like a bill that does not exist.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use homebase_core::{BillId, BillStatus, Money, UserId};

use super::RepositoryError;
use crate::models::{Bill, BillDraft, BillFilter, BillScope};

const BILL_COLUMNS: &str =
    "id, user_id, title, amount_cents, due_date, category, status, created_at";

#[derive(sqlx::FromRow)]
struct BillRow {
    id: i64,
    user_id: i64,
    title: String,
    amount_cents: i64,
    due_date: NaiveDate,
    category: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BillRow> for Bill {
    type Error = RepositoryError;

    fn try_from(row: BillRow) -> Result<Self, Self::Error> {
        if row.amount_cents < 0 {
            return Err(RepositoryError::DataCorruption(format!(
                "negative amount for bill {}",
                row.id
            )));
        }
        let status = row
            .status
            .parse::<BillStatus>()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: BillId::new(row.id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            amount: Money::from_cents(row.amount_cents),
            due_date: row.due_date,
            category: row.category,
            status,
            created_at: row.created_at,
        })
    }
}

/// Escape `LIKE` wildcards so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_scope(builder: &mut QueryBuilder<'_, Sqlite>, scope: BillScope) {
    match scope {
        BillScope::All => builder.push(" WHERE 1 = 1"),
        BillScope::Owner(user_id) => builder.push(" WHERE user_id = ").push_bind(user_id),
    };
}

/// Repository for bill database operations.
pub struct BillRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BillRepository<'a> {
    /// Create a new bill repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Bills visible in `scope` matching `filter`, ordered by due date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(
        &self,
        scope: BillScope,
        filter: &BillFilter,
    ) -> Result<Vec<Bill>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {BILL_COLUMNS} FROM bills"));
        push_scope(&mut builder, scope);

        if let Some(category) = &filter.category {
            builder.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(search) = &filter.search {
            let pattern = like_pattern(search);
            builder
                .push(" AND (title LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR category LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        builder.push(" ORDER BY due_date ASC, id ASC");

        let rows: Vec<BillRow> = builder.build_query_as().fetch_all(self.pool).await?;
        rows.into_iter().map(Bill::try_from).collect()
    }

    /// Distinct categories among the bills visible in `scope`, sorted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self, scope: BillScope) -> Result<Vec<String>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT DISTINCT category FROM bills");
        push_scope(&mut builder, scope);
        builder.push(" ORDER BY category");

        let categories: Vec<(String,)> = builder.build_query_as().fetch_all(self.pool).await?;
        Ok(categories.into_iter().map(|(c,)| c).collect())
    }

    /// Get a single bill if it is visible in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get(&self, scope: BillScope, id: BillId) -> Result<Option<Bill>, RepositoryError> {
        let row: Option<BillRow> = sqlx::query_as(&format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE id = ? AND (? IS NULL OR user_id = ?)"
        ))
        .bind(id)
        .bind(scope.owner())
        .bind(scope.owner())
        .fetch_optional(self.pool)
        .await?;

        row.map(Bill::try_from).transpose()
    }

    /// Create a bill owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (e.g. unknown owner).
    pub async fn create(&self, owner: UserId, draft: &BillDraft) -> Result<Bill, RepositoryError> {
        let row: BillRow = sqlx::query_as(&format!(
            r"
            INSERT INTO bills (title, amount_cents, due_date, category, status, user_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {BILL_COLUMNS}
            "
        ))
        .bind(&draft.title)
        .bind(draft.amount.cents())
        .bind(draft.due_date)
        .bind(&draft.category)
        .bind(draft.status)
        .bind(owner)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Bill::try_from(row)
    }

    /// Replace a bill's fields if it is visible in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the bill is missing or outside `scope`.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        scope: BillScope,
        id: BillId,
        draft: &BillDraft,
    ) -> Result<Bill, RepositoryError> {
        let row: Option<BillRow> = sqlx::query_as(&format!(
            r"
            UPDATE bills
            SET title = ?, amount_cents = ?, due_date = ?, category = ?, status = ?
            WHERE id = ? AND (? IS NULL OR user_id = ?)
            RETURNING {BILL_COLUMNS}
            "
        ))
        .bind(&draft.title)
        .bind(draft.amount.cents())
        .bind(draft.due_date)
        .bind(&draft.category)
        .bind(draft.status)
        .bind(id)
        .bind(scope.owner())
        .bind(scope.owner())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound).and_then(Bill::try_from)
    }

    /// Delete a bill if it is visible in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the bill is missing or outside `scope`.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, scope: BillScope, id: BillId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bills WHERE id = ? AND (? IS NULL OR user_id = ?)")
            .bind(id)
            .bind(scope.owner())
            .bind(scope.owner())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Flip a bill between `paid` and `unpaid` in one statement.
    ///
    /// Returns the new status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the bill is missing or outside `scope`.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn toggle_status(
        &self,
        scope: BillScope,
        id: BillId,
    ) -> Result<BillStatus, RepositoryError> {
        let status: Option<(String,)> = sqlx::query_as(
            r"
            UPDATE bills
            SET status = CASE status WHEN 'paid' THEN 'unpaid' ELSE 'paid' END
            WHERE id = ? AND (? IS NULL OR user_id = ?)
            RETURNING status
            ",
        )
        .bind(id)
        .bind(scope.owner())
        .bind(scope.owner())
        .fetch_optional(self.pool)
        .await?;

        let (status,) = status.ok_or(RepositoryError::NotFound)?;
        status.parse().map_err(RepositoryError::DataCorruption)
    }
}
