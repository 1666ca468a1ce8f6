//! Exact monetary amounts using decimal arithmetic.

use core::fmt;
use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Money`] amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input is not a number.
    #[error("amount is not a valid number")]
    Invalid,
    /// The amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
    /// The amount has more than two fractional digits.
    #[error("amount can have at most two decimal places")]
    TooPrecise,
    /// The amount exceeds the storable maximum.
    #[error("amount must be less than {max}")]
    TooLarge {
        /// Exclusive upper bound.
        max: Decimal,
    },
}

/// A non-negative amount of money with two fractional digits.
///
/// Persisted as integer cents; displayed as `$1,234.56`.
///
/// ```
/// use homebase_core::Money;
///
/// let rent = Money::parse("1250.5").unwrap();
/// assert_eq!(rent.cents(), 125_050);
/// assert_eq!(rent.to_string(), "$1,250.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest storable amount, exclusive (matches a `DECIMAL(10,2)` column).
    pub const MAX: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

    /// Create an amount from integer cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Parse a user-supplied amount such as `"12"`, `"12.5"` or `"12.50"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a number, is negative, has more
    /// than two decimal places, or is not below [`Money::MAX`].
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let value: Decimal = s.trim().parse().map_err(|_| MoneyError::Invalid)?;

        if value.is_zero() {
            return Ok(Self::ZERO);
        }
        if value.is_sign_negative() {
            return Err(MoneyError::Negative);
        }
        if value.normalize().scale() > 2 {
            return Err(MoneyError::TooPrecise);
        }
        if value >= Self::MAX {
            return Err(MoneyError::TooLarge { max: Self::MAX });
        }

        Ok(Self(value.round_dp(2)))
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount in whole cents.
    ///
    /// Saturates at `i64::MAX` for sums far beyond any storable amount.
    #[must_use]
    pub fn cents(&self) -> i64 {
        (self.0 * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or(i64::MAX)
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Plain two-decimal form without currency symbol or grouping, e.g. `1250.50`.
    ///
    /// Used to pre-fill form inputs.
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = self.to_plain_string();
        let (whole, frac) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let digits: Vec<char> = whole.chars().collect();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(*c);
        }

        write!(f, "${grouped}.{frac}")
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
