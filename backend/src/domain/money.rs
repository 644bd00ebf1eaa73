//! Exact decimal currency amounts.
//!
//! Balances and prices are `NUMERIC` in the database and [`Decimal`] here;
//! binary floats never take part in arithmetic. JSON carries amounts as plain
//! numbers, and inbound amounts are accepted either as numbers or as numeric
//! strings.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Number of fractional digits every amount is normalised to.
pub const MONEY_SCALE: u32 = 2;

/// Largest magnitude a `NUMERIC(12, 2)` column holds, in minor units.
pub const MONEY_MAX_MINOR: i64 = 999_999_999_999;

/// Validation errors for inbound amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyValidationError {
    /// The value is missing, not a number, or not a numeric string.
    NotNumeric,
    /// The value has more than two fractional digits.
    TooPrecise,
    /// The value must not be negative.
    Negative,
    /// The value must not be zero.
    Zero,
    /// The magnitude does not fit a stored balance.
    OutOfRange,
}

impl fmt::Display for MoneyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotNumeric => write!(f, "amount must be a number"),
            Self::TooPrecise => write!(f, "amount must have at most {MONEY_SCALE} decimal places"),
            Self::Negative => write!(f, "amount must not be negative"),
            Self::Zero => write!(f, "amount must not be zero"),
            Self::OutOfRange => write!(f, "amount is out of range"),
        }
    }
}

impl std::error::Error for MoneyValidationError {}

/// Currency amount with exactly two decimal places.
///
/// ## Invariants
/// - The scale is always [`MONEY_SCALE`].
/// - The magnitude never exceeds [`MONEY_MAX_MINOR`] minor units.
///
/// # Examples
/// ```
/// use storefront::domain::Money;
/// use serde_json::json;
///
/// let delta = Money::from_json(&json!("-10.5")).unwrap();
/// assert_eq!(delta.to_string(), "-10.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    #[must_use]
    pub fn zero() -> Self {
        Self(Decimal::new(0, MONEY_SCALE))
    }

    /// Build an amount from minor units (cents), saturating at the bounds.
    #[must_use]
    pub fn from_minor(minor: i64) -> Self {
        let clamped = minor.clamp(-MONEY_MAX_MINOR, MONEY_MAX_MINOR);
        Self(Decimal::new(clamped, MONEY_SCALE))
    }

    /// Largest representable amount.
    #[must_use]
    pub fn max() -> Self {
        Self::from_minor(MONEY_MAX_MINOR)
    }

    /// Wrap a decimal, rejecting values with more than two decimal places.
    pub fn try_from_decimal(value: Decimal) -> Result<Self, MoneyValidationError> {
        let normalized = value.normalize();
        if normalized.scale() > MONEY_SCALE {
            return Err(MoneyValidationError::TooPrecise);
        }
        let mut scaled = normalized;
        scaled.rescale(MONEY_SCALE);
        if scaled.abs() > Self::max().0 {
            return Err(MoneyValidationError::OutOfRange);
        }
        Ok(Self(scaled))
    }

    /// Parse an inbound JSON value (number or numeric string).
    pub fn from_json(value: &Value) -> Result<Self, MoneyValidationError> {
        let raw = match value {
            Value::Number(number) => number.to_string(),
            Value::String(text) => text.trim().to_owned(),
            _ => return Err(MoneyValidationError::NotNumeric),
        };
        let decimal = Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map_err(|_| MoneyValidationError::NotNumeric)?;
        Self::try_from_decimal(decimal)
    }

    /// Parse a signed, non-zero adjustment.
    pub fn delta_from_json(value: &Value) -> Result<Self, MoneyValidationError> {
        let amount = Self::from_json(value)?;
        if amount.is_zero() {
            return Err(MoneyValidationError::Zero);
        }
        Ok(amount)
    }

    /// Parse an amount that must be zero or positive.
    pub fn non_negative_from_json(value: &Value) -> Result<Self, MoneyValidationError> {
        let amount = Self::from_json(value)?;
        if amount.is_negative() {
            return Err(MoneyValidationError::Negative);
        }
        Ok(amount)
    }

    /// Underlying decimal value.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Checked addition; `None` when the sum leaves the representable range.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0
            .checked_add(other.0)
            .and_then(|sum| Self::try_from_decimal(sum).ok())
    }

    /// Checked multiplication by a quantity; `None` when out of range.
    #[must_use]
    pub fn checked_mul_quantity(self, quantity: u32) -> Option<Self> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .and_then(|product| Self::try_from_decimal(product).ok())
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}
