//! Money type with precise decimal arithmetic
//!
//! Premiums, payment amounts and balances are all carried as `Money`, a
//! thin wrapper over `rust_decimal::Decimal`. Amounts never pass through
//! floating point, so `premium - Σ payments` is exact.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use thiserror::Error;

/// Number of decimal places kept internally
const SCALE: u32 = 4;

/// Number of decimal places used when displaying an amount
const DISPLAY_SCALE: usize = 2;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount in the policy currency
///
/// Amounts are rounded to 4 decimal places on construction. The type is
/// signed so intermediate results (`premium - paid`) can be represented;
/// use [`Money::saturating_sub`] when a result must not drop below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp(SCALE))
    }

    /// Creates a strictly positive amount
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidAmount` for zero or negative input
    pub fn positive(amount: Decimal) -> Result<Self, MoneyError> {
        let money = Self::new(amount);
        if !money.is_positive() {
            return Err(MoneyError::InvalidAmount(format!(
                "amount must be greater than 0, got {}",
                amount
            )));
        }
        Ok(money)
    }

    /// Creates an amount that may be zero but not negative
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidAmount` for negative input
    pub fn non_negative(amount: Decimal) -> Result<Self, MoneyError> {
        let money = Self::new(amount);
        if money.is_negative() {
            return Err(MoneyError::InvalidAmount(format!(
                "amount cannot be negative, got {}",
                amount
            )));
        }
        Ok(money)
    }

    /// Creates a zero amount
    pub fn zero() -> Self {
        Self(dec!(0))
    }

    /// Largest amount the `NUMERIC(18, 4)` columns can hold
    pub fn max_stored() -> Self {
        Self(dec!(99999999999999.9999))
    }

    /// Returns true if the amount fits the stored precision
    pub fn fits_storage(&self) -> bool {
        self.0 <= Self::max_stored().0
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns true if the amount is strictly negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Checked addition that reports overflow instead of panicking
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction that reports overflow instead of panicking
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Subtracts `other`, flooring the result at zero
    pub fn saturating_sub(&self, other: &Money) -> Money {
        match self.checked_sub(other) {
            Ok(diff) if diff.is_negative() => Money::zero(),
            Ok(diff) => diff,
            // Only reachable when `other` is hugely negative; the floor still holds.
            Err(_) => *self,
        }
    }

    /// Sums amounts, reporting overflow
    pub fn checked_sum<'a, I>(amounts: I) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Decimal {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.dp$}", self.0, dp = DISPLAY_SCALE)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other).expect("Overflow in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other).expect("Overflow in Money::sub")
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let m = Money::new(dec!(100.50));
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_positive_rejects_zero() {
        assert!(Money::positive(dec!(0)).is_err());
        assert!(Money::positive(dec!(-1)).is_err());
        assert!(Money::positive(dec!(0.01)).is_ok());
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let premium = Money::new(dec!(50));
        let paid = Money::new(dec!(75));
        assert_eq!(premium.saturating_sub(&paid), Money::zero());
        assert_eq!(paid.saturating_sub(&premium), Money::new(dec!(25)));
    }

    #[test]
    fn test_display_uses_two_places() {
        assert_eq!(Money::new(dec!(40)).to_string(), "$40.00");
    }
}
