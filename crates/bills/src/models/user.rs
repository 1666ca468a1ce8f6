//! User domain types.

use chrono::{DateTime, Utc};

use homebase_core::{Money, Role, UserId, Username};

/// A bill tracker account (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name, unique across accounts.
    pub username: Username,
    /// Permission level.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// A user together with aggregate numbers over their bills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub user: User,
    /// Number of bills owned.
    pub bill_count: i64,
    /// Sum of all bill amounts.
    pub total_amount: Money,
    /// Number of bills still unpaid.
    pub unpaid_count: i64,
}
