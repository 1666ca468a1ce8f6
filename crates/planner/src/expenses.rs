//! Income and expense entries.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::storage::{Collection, Storage};
use crate::{contains_ignore_case, new_id, non_blank, remove_by_id};

/// Storage key for the expense list.
pub const EXPENSES_KEY: &str = "expenses";

/// Category used when none is given.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Number of categories in the spending breakdown.
pub const TOP_CATEGORY_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[default]
    Expense,
    Income,
}

impl std::str::FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            _ => Err(format!("invalid entry type: {s}")),
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Expense => "expense",
            Self::Income => "income",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    /// Stored as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Input for [`Expenses::add`].
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: Decimal,
    pub description: String,
    pub category: Option<String>,
    pub kind: EntryType,
    pub date: NaiveDate,
}

/// Expense list filter. The default matches every entry.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Matched against description and category, ignoring case.
    pub search: String,
    /// Exact category.
    pub category: Option<String>,
    pub kind: Option<EntryType>,
}

impl ExpenseFilter {
    #[must_use]
    pub fn matches(&self, expense: &Expense) -> bool {
        let matches_search = contains_ignore_case(&expense.description, &self.search)
            || contains_ignore_case(&expense.category, &self.search);
        matches_search
            && self
                .category
                .as_deref()
                .is_none_or(|c| c == expense.category)
            && self.kind.is_none_or(|k| k == expense.kind)
    }
}

/// Totals for the current month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlySummary {
    pub income: Decimal,
    pub expenses: Decimal,
    /// Income minus expenses.
    pub net: Decimal,
}

/// The persisted expense list.
pub struct Expenses<'a> {
    items: Collection<'a, Expense>,
}

impl<'a> Expenses<'a> {
    #[must_use]
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self {
            items: Collection::new(storage, EXPENSES_KEY),
        }
    }

    /// All entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError` if storage cannot be read.
    pub fn all(&self) -> Result<Vec<Expense>, PlannerError> {
        self.items.load()
    }

    /// Add an entry at the front of the list.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::InvalidAmount` for amounts of zero or less and
    /// `PlannerError::Required` for a blank description.
    pub fn add(&self, new: NewExpense) -> Result<Expense, PlannerError> {
        if new.amount <= Decimal::ZERO {
            return Err(PlannerError::InvalidAmount);
        }
        let description =
            non_blank(Some(&new.description)).ok_or(PlannerError::Required("description"))?;
        let expense = Expense {
            id: new_id(),
            amount: new.amount,
            description,
            category: non_blank(new.category.as_deref())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            date: new.date,
            kind: new.kind,
            tags: Some(Vec::new()),
        };

        self.items.update(|items| {
            items.insert(0, expense.clone());
            Ok(())
        })?;
        Ok(expense)
    }

    /// Remove an entry. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError` if storage fails.
    pub fn delete(&self, id: &str) -> Result<bool, PlannerError> {
        self.items
            .update(|items| Ok(remove_by_id(items, id, |e: &Expense| &e.id)))
    }
}

/// Entries matching `filter`, in list order.
#[must_use]
pub fn filter<'e>(expenses: &'e [Expense], filter: &ExpenseFilter) -> Vec<&'e Expense> {
    expenses.iter().filter(|e| filter.matches(e)).collect()
}

/// Income and spending dated on or after the first of `today`'s month.
#[must_use]
pub fn monthly_summary(expenses: &[Expense], today: NaiveDate) -> MonthlySummary {
    let month_start = today.with_day(1).unwrap_or(today);
    let (income, spent) = expenses
        .iter()
        .filter(|e| e.date >= month_start)
        .fold((Decimal::ZERO, Decimal::ZERO), |(income, spent), e| match e.kind {
            EntryType::Income => (income + e.amount, spent),
            EntryType::Expense => (income, spent + e.amount),
        });
    MonthlySummary {
        income,
        expenses: spent,
        net: income - spent,
    }
}

/// Distinct categories in first-seen order.
#[must_use]
pub fn categories(expenses: &[Expense]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for expense in expenses {
        if !seen.contains(&expense.category) {
            seen.push(expense.category.clone());
        }
    }
    seen
}

/// Spending per category, largest first, at most five entries.
///
/// Income is ignored. Equal totals keep first-seen order.
#[must_use]
pub fn top_categories(expenses: &[Expense]) -> Vec<(String, Decimal)> {
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    for expense in expenses.iter().filter(|e| e.kind == EntryType::Expense) {
        match totals.iter_mut().find(|(c, _)| *c == expense.category) {
            Some((_, total)) => *total += expense.amount,
            None => totals.push((expense.category.clone(), expense.amount)),
        }
    }
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.truncate(TOP_CATEGORY_LIMIT);
    totals
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn d(amount: &str) -> Decimal {
        amount.parse().unwrap()
    }

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, n).unwrap()
    }

    fn entry(amount: Decimal, description: &str, category: &str, kind: EntryType, date: NaiveDate) -> NewExpense {
        NewExpense {
            amount,
            description: description.to_string(),
            category: Some(category.to_string()),
            kind,
            date,
        }
    }

    #[test]
    fn test_add_validates_and_defaults() {
        let storage = MemoryStorage::new();
        let book = Expenses::new(&storage);

        assert!(matches!(
            book.add(entry(d("0"), "Coffee", "Food", EntryType::Expense, day(1))),
            Err(PlannerError::InvalidAmount)
        ));
        assert!(matches!(
            book.add(entry(d("3.50"), "  ", "Food", EntryType::Expense, day(1))),
            Err(PlannerError::Required("description"))
        ));

        let coffee = book
            .add(entry(d("3.50"), "Coffee", " ", EntryType::Expense, day(1)))
            .unwrap();
        assert_eq!(coffee.category, "Other");
        assert_eq!(coffee.tags, Some(Vec::new()));
        assert_eq!(book.all().unwrap().len(), 1);
    }

    #[test]
    fn test_amount_is_a_json_number() {
        let storage = MemoryStorage::new();
        Expenses::new(&storage)
            .add(entry(d("12.25"), "Lunch", "Food", EntryType::Expense, day(3)))
            .unwrap();

        let raw = storage.get_item(EXPENSES_KEY).unwrap().unwrap();
        assert!(raw.contains(r#""amount":12.25"#));
        assert!(raw.contains(r#""type":"expense""#));
        assert!(raw.contains(r#""date":"2025-05-03""#));
    }

    #[test]
    fn test_monthly_summary_starts_on_the_first() {
        let storage = MemoryStorage::new();
        let book = Expenses::new(&storage);
        book.add(entry(d("100"), "Old rent", "Housing", EntryType::Expense, NaiveDate::from_ymd_opt(2025, 4, 30).unwrap()))
            .unwrap();
        book.add(entry(d("2000"), "Salary", "Work", EntryType::Income, day(1))).unwrap();
        book.add(entry(d("40.10"), "Groceries", "Food", EntryType::Expense, day(9))).unwrap();

        let summary = monthly_summary(&book.all().unwrap(), day(15));
        assert_eq!(summary.income, d("2000"));
        assert_eq!(summary.expenses, d("40.10"));
        assert_eq!(summary.net, d("1959.90"));
    }

    #[test]
    fn test_categories_and_top_categories() {
        let storage = MemoryStorage::new();
        let book = Expenses::new(&storage);
        for (amount, category, kind) in [
            (d("5"), "Food", EntryType::Expense),
            (d("50"), "Travel", EntryType::Expense),
            (d("500"), "Work", EntryType::Income),
            (d("20"), "Food", EntryType::Expense),
            (d("1"), "A", EntryType::Expense),
            (d("2"), "B", EntryType::Expense),
            (d("3"), "C", EntryType::Expense),
        ] {
            book.add(entry(amount, "x", category, kind, day(2))).unwrap();
        }
        let all = book.all().unwrap();

        // Newest first, so the last added category is seen first.
        assert_eq!(categories(&all), ["C", "B", "A", "Food", "Work", "Travel"]);

        let top = top_categories(&all);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0], ("Travel".to_string(), d("50")));
        assert_eq!(top[1], ("Food".to_string(), d("25")));
        assert!(top.iter().all(|(c, _)| c != "Work"));
    }

    #[test]
    fn test_filter_and_delete() {
        let storage = MemoryStorage::new();
        let book = Expenses::new(&storage);
        let rent = book.add(entry(d("900"), "Rent", "Housing", EntryType::Expense, day(1))).unwrap();
        book.add(entry(d("2000"), "Salary", "Work", EntryType::Income, day(1))).unwrap();

        let all = book.all().unwrap();
        let housing = ExpenseFilter {
            search: "hous".to_string(),
            ..ExpenseFilter::default()
        };
        assert_eq!(filter(&all, &housing)[0].id, rent.id);

        let income = ExpenseFilter {
            kind: Some(EntryType::Income),
            ..ExpenseFilter::default()
        };
        assert_eq!(filter(&all, &income)[0].description, "Salary");

        assert!(book.delete(&rent.id).unwrap());
        let left: Vec<_> = book.all().unwrap().into_iter().map(|e| e.description).collect();
        assert_eq!(left, ["Salary"]);
    }
}
