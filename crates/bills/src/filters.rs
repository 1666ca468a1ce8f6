//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::NaiveDate;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an ISO date (`2025-03-01`) as `Mar 01, 2025`.
///
/// Values that are not ISO dates are rendered unchanged.
///
/// Usage in templates: `{{ bill.due_date|long_date }}`
#[askama::filter_fn]
pub fn long_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    Ok(NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_or(raw, |date| date.format("%b %d, %Y").to_string()))
}
