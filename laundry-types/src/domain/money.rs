//! Rupiah amounts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// A non-negative amount of Indonesian rupiah.
///
/// Rupiah is settled in whole units, so the value is stored as an integer
/// count of rupiah. The gateway takes the same integer: there is no minor-unit
/// scaling anywhere between a line item and a payment session.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Money(i64);

impl Money {
    /// Creates a new Money value.
    pub fn new(amount: i64) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::NegativeAmount);
        }
        Ok(Self(amount))
    }

    /// Zero rupiah.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in rupiah.
    pub fn amount(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(&self, other: Money) -> Result<Money, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(DomainError::AmountOverflow)
    }

    /// Multiplies a unit price by a quantity.
    pub fn checked_mul(&self, quantity: i64) -> Result<Money, DomainError> {
        if quantity < 0 {
            return Err(DomainError::NegativeAmount);
        }
        self.0
            .checked_mul(quantity)
            .map(Money)
            .ok_or(DomainError::AmountOverflow)
    }
}

impl TryFrom<i64> for Money {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        write!(f, "Rp{}", grouped)
    }
}
