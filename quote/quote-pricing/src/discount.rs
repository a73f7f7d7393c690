//! Order discounts and student eligibility.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Percentage granted to requesters with an academic email address.
pub const STUDENT_DISCOUNT_PERCENT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// A discount on the order subtotal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// No discount.
    #[default]
    None,
    /// Percentage of the subtotal (0-100).
    Percent(Decimal),
    /// Fixed amount off.
    Fixed(Money),
}

impl Discount {
    /// Amount taken off `subtotal`, rounded to cents.
    ///
    /// Never negative and never more than the subtotal, so the discounted
    /// subtotal stays at or above zero.
    #[must_use]
    pub fn amount_off(&self, subtotal: Money) -> Money {
        let subtotal = subtotal.floor_zero();
        let off = match *self {
            Self::None => Money::ZERO,
            Self::Percent(percent) => {
                let percent = percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
                subtotal * (percent / Decimal::ONE_HUNDRED)
            }
            Self::Fixed(amount) => amount,
        };
        off.floor_zero().min(subtotal).round_cents()
    }

    /// True for anything but [`Discount::None`].
    #[must_use]
    pub fn is_some(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Where the applied discount came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountSource {
    /// No discount applied.
    #[default]
    None,
    /// Explicitly requested with the order.
    Requested,
    /// Derived from a student email address.
    Student,
}

/// True when the email's domain has an `edu` label
/// (`uni.edu`, `cs.mit.edu`, `student.edu.au`).
#[must_use]
pub fn is_student_email(email: &str) -> bool {
    let Some((_, domain)) = email.trim().rsplit_once('@') else {
        return false;
    };
    domain
        .split('.')
        .any(|label| label.eq_ignore_ascii_case("edu"))
}

/// Pick the discount for an order.
///
/// An explicitly requested discount wins. Otherwise a student email earns
/// [`STUDENT_DISCOUNT_PERCENT`]. Requesting [`Discount::None`] does not
/// opt a student out.
#[must_use]
pub fn resolve_discount(
    requested: Option<Discount>,
    email: Option<&str>,
) -> (Discount, DiscountSource) {
    match requested {
        Some(discount) if discount.is_some() => (discount, DiscountSource::Requested),
        _ if email.is_some_and(is_student_email) => (
            Discount::Percent(STUDENT_DISCOUNT_PERCENT),
            DiscountSource::Student,
        ),
        _ => (Discount::None, DiscountSource::None),
    }
}
