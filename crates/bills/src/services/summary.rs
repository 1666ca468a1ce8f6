//! Dashboard statistics.
//!
//! Pure computation over the bills visible to the current user; the route
//! loads the bills and passes today's date in.

use chrono::{Days, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use homebase_core::Money;

use crate::models::Bill;

/// How far ahead (inclusive) an unpaid bill counts as upcoming.
pub const UPCOMING_WINDOW_DAYS: u64 = 7;

/// Total spent in one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
    /// Share of the overall amount, 0-100.
    pub percent: u32,
}

/// Aggregates shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_count: usize,
    pub total_amount: Money,
    pub paid_total: Money,
    pub unpaid_total: Money,
    /// Paid share of the total amount, rounded; 0 when there is nothing to pay.
    pub paid_percent: u32,
    pub unpaid_count: usize,
    /// Unpaid and due before today.
    pub overdue_count: usize,
    /// Unpaid and due between today and today + 7 days, soonest first.
    pub upcoming: Vec<Bill>,
    /// Per-category totals, largest first.
    pub categories: Vec<CategoryTotal>,
}

impl DashboardSummary {
    /// Compute the summary for `bills` as of `today`.
    #[must_use]
    pub fn compute(bills: &[Bill], today: NaiveDate) -> Self {
        let total_amount: Money = bills.iter().map(|b| b.amount).sum();
        let paid_total: Money = bills.iter().filter(|b| b.is_paid()).map(|b| b.amount).sum();
        let unpaid: Vec<&Bill> = bills.iter().filter(|b| !b.is_paid()).collect();
        let unpaid_total: Money = unpaid.iter().map(|b| b.amount).sum();

        let overdue_count = unpaid.iter().filter(|b| b.is_overdue(today)).count();

        let horizon = today
            .checked_add_days(Days::new(UPCOMING_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MAX);
        let mut upcoming: Vec<Bill> = unpaid
            .iter()
            .filter(|b| b.due_date >= today && b.due_date <= horizon)
            .map(|b| (*b).clone())
            .collect();
        upcoming.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));

        Self {
            total_count: bills.len(),
            total_amount,
            paid_total,
            unpaid_total,
            paid_percent: percent_of(paid_total, total_amount),
            unpaid_count: unpaid.len(),
            overdue_count,
            upcoming,
            categories: category_totals(bills, total_amount),
        }
    }
}

fn category_totals(bills: &[Bill], total_amount: Money) -> Vec<CategoryTotal> {
    let mut totals: Vec<(String, Money)> = Vec::new();
    for bill in bills {
        match totals.iter_mut().find(|(c, _)| *c == bill.category) {
            Some((_, sum)) => *sum = *sum + bill.amount,
            None => totals.push((bill.category.clone(), bill.amount)),
        }
    }

    totals.sort_by(|(ca, a), (cb, b)| b.cmp(a).then_with(|| ca.cmp(cb)));
    totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            percent: percent_of(total, total_amount),
            category,
            total,
        })
        .collect()
}

/// `part / whole * 100`, rounded half away from zero.
fn percent_of(part: Money, whole: Money) -> u32 {
    if whole.is_zero() {
        return 0;
    }
    (part.amount() * Decimal::ONE_HUNDRED / whole.amount())
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use homebase_core::{BillId, BillStatus, UserId};

    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn bill(id: i64, cents: i64, due: &str, category: &str, status: BillStatus) -> Bill {
        Bill {
            id: BillId::new(id),
            user_id: UserId::new(1),
            title: format!("Bill {id}"),
            amount: Money::from_cents(cents),
            due_date: date(due),
            category: category.to_string(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = DashboardSummary::compute(&[], date("2025-06-15"));
        assert_eq!(summary.total_count, 0);
        assert!(summary.total_amount.is_zero());
        assert_eq!(summary.paid_percent, 0);
        assert!(summary.upcoming.is_empty());
        assert!(summary.categories.is_empty());
    }

    #[test]
    fn test_totals_and_counts() {
        let today = date("2025-06-15");
        let bills = vec![
            bill(1, 10_000, "2025-06-01", "Housing", BillStatus::Paid),
            bill(2, 5_000, "2025-06-10", "Utilities", BillStatus::Unpaid),
            bill(3, 2_500, "2025-06-15", "Utilities", BillStatus::Unpaid),
            bill(4, 2_500, "2025-06-22", "Other", BillStatus::Unpaid),
            bill(5, 1_000, "2025-06-23", "Other", BillStatus::Unpaid),
        ];

        let summary = DashboardSummary::compute(&bills, today);

        assert_eq!(summary.total_count, 5);
        assert_eq!(summary.total_amount.cents(), 21_000);
        assert_eq!(summary.paid_total.cents(), 10_000);
        assert_eq!(summary.unpaid_total.cents(), 11_000);
        assert_eq!(summary.paid_percent, 48);
        assert_eq!(summary.unpaid_count, 4);
        assert_eq!(summary.overdue_count, 1);

        let upcoming: Vec<i64> = summary.upcoming.iter().map(|b| b.id.as_i64()).collect();
        assert_eq!(upcoming, [3, 4]);
    }

    #[test]
    fn test_category_totals_sorted_descending() {
        let bills = vec![
            bill(1, 1_000, "2025-06-01", "Other", BillStatus::Paid),
            bill(2, 3_000, "2025-06-02", "Utilities", BillStatus::Unpaid),
            bill(3, 1_000, "2025-06-03", "Utilities", BillStatus::Unpaid),
            bill(4, 5_000, "2025-06-04", "Housing", BillStatus::Paid),
        ];

        let summary = DashboardSummary::compute(&bills, date("2025-06-01"));
        let order: Vec<(&str, i64, u32)> = summary
            .categories
            .iter()
            .map(|c| (c.category.as_str(), c.total.cents(), c.percent))
            .collect();
        assert_eq!(
            order,
            [("Housing", 5_000, 50), ("Utilities", 4_000, 40), ("Other", 1_000, 10)]
        );
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(percent_of(Money::from_cents(1), Money::from_cents(8)), 13);
        assert_eq!(percent_of(Money::from_cents(1), Money::from_cents(3)), 33);
        assert_eq!(percent_of(Money::ZERO, Money::ZERO), 0);
    }
}
