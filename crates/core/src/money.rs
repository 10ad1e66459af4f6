use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;
use thiserror::Error;

/// A sum or difference left the range `Decimal` can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Amount out of range: totals exceed the largest representable value")]
pub struct AmountOverflow;

/// A rupee amount held as a decimal rounded to two places, so that sums of
/// many rows stay exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    /// Rounds to paise and pins the scale at two places, so "12.5" is held
    /// (and serialized) as "12.50".
    pub fn from_decimal(decimal: Decimal) -> Self {
        let mut d = decimal.round_dp(2);
        d.rescale(2);
        Money(d)
    }

    /// Converts a spreadsheet float. Non-finite values yield `None`.
    pub fn from_f64(value: f64) -> Option<Self> {
        Decimal::from_f64(value).map(Self::from_decimal)
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, AmountOverflow> {
        self.0.checked_add(rhs.0).map(Self::from_decimal).ok_or(AmountOverflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, AmountOverflow> {
        self.0.checked_sub(rhs.0).map(Self::from_decimal).ok_or(AmountOverflow)
    }

    /// Exact sum of `amounts`, failing instead of wrapping or panicking.
    pub fn try_sum(amounts: impl IntoIterator<Item = Money>) -> Result<Self, AmountOverflow> {
        amounts.into_iter().try_fold(Money::zero(), Money::checked_add)
    }

    /// Lossy conversion for spreadsheet writers, which store IEEE doubles.
    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    /// Accepts plain decimals with optional thousands separators ("1,200.50").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clean = s.trim().replace(',', "");
        Decimal::from_str(&clean).map(Self::from_decimal)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Money(-self.0)
    }
}
