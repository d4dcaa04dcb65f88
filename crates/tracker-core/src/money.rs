//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  An expense report summing hundreds of KES 0.10 stationery entries     │
//! │  drifts away from the bank statement.                                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer cents                                            │
//! │    KES 700.00 = 70000 cents, 3 × 70000 = 210000 cents, exactly         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tracker_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(70_000); // KES 700.00
//!
//! // Arithmetic operations
//! let total = price * 3_i64;
//! assert_eq!(total.to_string(), "KES 2,100.00");
//!
//! // Parse what a clerk typed into a form
//! let amount: Money = "1,250.5".parse().unwrap();
//! assert_eq!(amount.cents(), 125_050);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::CURRENCY_CODE;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: net income in a report can be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serde**: serializes as plain cents; use [`major_units`] where an
///   external format expects decimal amounts
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Expense.amount ──────────────────────────► Expense summary report      │
/// │                                                                         │
/// │  StockItem.unit_cost ──► Inventory valuation (quantity × unit_cost)     │
/// │                                                                         │
/// │  Sale.selling_price ──► Sale.total ──► Receipt.total_amount ──► HTML   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tracker_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // KES 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use tracker_core::money::Money;
    ///
    /// let price = Money::from_major_minor(500, 0); // KES 500.00
    /// assert_eq!(price.cents(), 50_000);
    ///
    /// let negative = Money::from_major_minor(-5, 50);
    /// assert_eq!(negative.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (shillings) portion.
    ///
    /// ## Example
    /// ```rust
    /// use tracker_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).major(), 10);
    /// assert_eq!(Money::from_cents(-550).major(), -5);
    /// ```
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use tracker_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(70_000); // KES 700.00
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 210_000); // KES 2,100.00
    /// ```
    ///
    /// Saturates at the `i64` bounds. Validated prices and quantities never
    /// get there (see [`MAX_AMOUNT_CENTS`](crate::MAX_AMOUNT_CENTS)).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Divides evenly by a count, truncating toward zero.
    ///
    /// Returns zero when `count` is zero (used for "average item value"
    /// on an empty inventory).
    pub fn per_unit(&self, count: i64) -> Money {
        if count == 0 {
            return Money::zero();
        }
        Money(self.0 / count)
    }

    /// Machine-readable decimal without grouping: `2100.00`, `-5.50`.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major().unsigned_abs(), self.minor_part())
    }

    /// Formats the amount without the currency code: `2,100.00`.
    pub fn format_plain(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}.{:02}",
            sign,
            group_thousands(self.major().unsigned_abs()),
            self.minor_part()
        )
    }
}

/// Inserts a comma every three digits: 1234567 → "1,234,567".
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money the way it appears on receipts and reports: `KES 2,100.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-{} {}", CURRENCY_CODE, self.abs().format_plain())
        } else {
            write!(f, "{} {}", CURRENCY_CODE, self.format_plain())
        }
    }
}

/// Parses a decimal amount as typed by staff.
///
/// Accepts an optional `KES` prefix, thousands separators and up to two
/// decimal places: `"500"`, `"2,100.50"`, `"KES 12.5"`, `"-3.25"`.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let mut text = input.trim();
        if let Some(prefix) = text.get(..CURRENCY_CODE.len()) {
            if prefix.eq_ignore_ascii_case(CURRENCY_CODE) {
                text = text[CURRENCY_CODE.len()..].trim_start();
            }
        }

        let (negative, text) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let cleaned: String = text.chars().filter(|c| *c != ',').collect();
        if cleaned.is_empty() {
            return Err(invalid("must not be empty"));
        }

        let (major_str, minor_str) = match cleaned.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (cleaned.as_str(), ""),
        };

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("must be a decimal number"));
        }
        if minor_str.len() > 2 || !minor_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("at most two decimal places are allowed"));
        }

        let major: i64 = major_str.parse().map_err(|_| invalid("amount is too large"))?;
        let minor: i64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => minor_str.parse().map_err(|_| invalid("bad fraction"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Serde Adapter
// =============================================================================

/// Serializes `Money` as a decimal number of major units (`700.0`).
///
/// Receipt line items are persisted as JSON with a decimal `price`, the
/// format older receipts were stored in. Use with
/// `#[serde(with = "crate::money::major_units")]`.
pub mod major_units {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(money.cents() as f64 / 100.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let major = f64::deserialize(deserializer)?;
        if !major.is_finite() {
            return Err(serde::de::Error::custom("price must be a finite number"));
        }
        // Stored values carry at most two decimals; rounding absorbs the
        // binary representation error of e.g. 0.29.
        Ok(Money::from_cents((major * 100.0).round() as i64))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
