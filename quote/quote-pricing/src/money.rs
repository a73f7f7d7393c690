//! Decimal currency amounts.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A currency amount.
///
/// Arithmetic is exact decimal. Reported amounts are rounded to cents with
/// [`round_cents`](Self::round_cents) (half away from zero). The currency
/// itself is whatever the business settings are written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Amount from whole cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Round to cents, half away from zero.
    #[must_use]
    pub fn round_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// This amount, or zero if negative.
    #[must_use]
    pub fn floor_zero(self) -> Self {
        self.max(Self::ZERO)
    }

    /// True for amounts below zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiply by a measured quantity (grams, hours).
    ///
    /// Returns `None` for a non-finite quantity or when the product does
    /// not fit a decimal.
    #[must_use]
    pub fn times_f64(self, quantity: f64) -> Option<Self> {
        Decimal::from_f64(quantity).and_then(|q| self.checked_mul(q))
    }

    /// Product, or `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, factor: Decimal) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    /// Sum, or `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.round_cents().0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(Money::new(dec!(2.345)).round_cents(), Money::new(dec!(2.35)));
        assert_eq!(Money::new(dec!(2.344)).round_cents(), Money::new(dec!(2.34)));
        assert_eq!(Money::new(dec!(-2.345)).round_cents(), Money::new(dec!(-2.35)));
    }

    #[test]
    fn test_cents_are_exact() {
        // 0.1 + 0.2 is exactly 0.3 in decimal.
        let sum = Money::new(dec!(0.1)) + Money::new(dec!(0.2));
        assert_eq!(sum, Money::new(dec!(0.3)));
        assert_eq!(Money::from_cents(1099), Money::new(dec!(10.99)));
    }

    #[test]
    fn test_times_f64() {
        let per_gram = Money::new(dec!(0.05));
        assert_eq!(per_gram.times_f64(12.5).unwrap(), Money::new(dec!(0.625)));
        assert!(per_gram.times_f64(f64::NAN).is_none());
        assert!(per_gram.times_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn test_overflow_is_reported() {
        let huge = Money::new(Decimal::MAX);
        assert!(huge.checked_mul(dec!(2)).is_none());
        assert!(huge.checked_add(Money::from_cents(1)).is_none());
        assert!(Money::from_cents(200).times_f64(5e28).is_none());
        assert_eq!(
            Money::from_cents(200).checked_mul(dec!(3)),
            Some(Money::from_cents(600))
        );
    }

    #[test]
    fn test_floor_zero() {
        assert_eq!(Money::new(dec!(-3)).floor_zero(), Money::ZERO);
        assert_eq!(Money::new(dec!(3)).floor_zero(), Money::new(dec!(3)));
        assert!(Money::new(dec!(-0.01)).is_negative());
        assert!(!Money::ZERO.is_negative());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::new(dec!(95)).to_string(), "95.00");
        assert_eq!(Money::new(dec!(1.005)).to_string(), "1.01");
    }

    #[test]
    fn test_serde_accepts_strings_and_numbers() {
        let from_str: Money = serde_json::from_str("\"12.50\"").unwrap();
        let from_num: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(from_str, from_num);
    }

    #[test]
    fn test_sum() {
        let total: Money = [dec!(1.10), dec!(2.20), dec!(3.30)]
            .into_iter()
            .map(Money::new)
            .sum();
        assert_eq!(total, Money::new(dec!(6.60)));
    }
}
