//! Non-negative currency amounts and percentage rates.
//!
//! Absence of an amount is always `Option::<Money>::None`; a `Money` value of
//! zero is a real figure (e.g. free delivery) and takes part in fee maths.

use std::fmt;
use std::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-negative amount in the listing's single fixed currency.
///
/// Stored at full decimal precision. Two-decimal presentation is the
/// caller's concern; see [`Money::to_pennies`]. Arithmetic saturates at
/// `Decimal::MAX` instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wraps `amount`, returning `None` for negative values.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            None
        } else {
            Some(Self(amount.normalize()))
        }
    }

    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Rounds to two decimal places, midpoint away from zero.
    #[must_use]
    pub fn to_pennies(self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }

    /// Rounds to whole currency units, midpoint away from zero.
    #[must_use]
    pub fn to_whole_units(self) -> Decimal {
        self.0
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = String;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value).ok_or_else(|| format!("amount must be non-negative, got {value}"))
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl Mul<Rate> for Money {
    type Output = Money;

    fn mul(self, rate: Rate) -> Money {
        Money(self.0.saturating_mul(rate.0).normalize())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_pennies())
    }
}

/// A non-negative fractional rate, e.g. `0.20` for 20%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Rate(Decimal);

impl Rate {
    /// Returns `None` for negative rates.
    #[must_use]
    pub fn new(fraction: Decimal) -> Option<Self> {
        if fraction.is_sign_negative() && !fraction.is_zero() {
            None
        } else {
            Some(Self(fraction))
        }
    }

    /// Builds a rate from a whole-number percentage, e.g. `20` for 20%.
    #[must_use]
    pub const fn from_percent(percent: u32) -> Self {
        Self(Decimal::from_parts(percent, 0, 0, false, 2))
    }

    #[must_use]
    pub fn fraction(self) -> Decimal {
        self.0
    }

    /// The rate as a whole-number percentage, e.g. `20` for `0.20`.
    #[must_use]
    pub fn percent(self) -> Decimal {
        self.0.saturating_mul(Decimal::ONE_HUNDRED).normalize()
    }
}

impl TryFrom<Decimal> for Rate {
    type Error = String;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Rate::new(value).ok_or_else(|| format!("rate must be non-negative, got {value}"))
    }
}

impl From<Rate> for Decimal {
    fn from(value: Rate) -> Self {
        value.0
    }
}
