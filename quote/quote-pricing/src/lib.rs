//! Itemized pricing for quick 3D print orders.
//!
//! Turns per-item slicer metrics and support estimates into a priced quote:
//! material and machine-time costs, setup fee, a minimum-price floor, then
//! order-level discount, shipping, and tax. All currency is decimal
//! ([`Money`]); floats only appear as measured grams and seconds.
//!
//! # Example
//!
//! ```
//! use mesh_slice::SliceMetrics;
//! use quote_pricing::{DeliveryLocation, Money, PricingSettings, QuickOrderItem, QuickOrderPricer};
//! use rust_decimal::Decimal;
//!
//! let settings = PricingSettings::default()
//!     .with_hourly_rate(Money::new(Decimal::from(50)))
//!     .with_setup_fee(Money::new(Decimal::from(10)))
//!     .with_minimum_price(Money::new(Decimal::from(20)))
//!     .with_material("pla", Money::from_cents(50))
//!     .with_material("pva", Money::from_cents(100));
//!
//! let item = QuickOrderItem::new("bracket", "pla", SliceMetrics::sliced(3600.0, 50.0, None))
//!     .with_support_material("pva")
//!     .with_support_grams(10.0);
//!
//! let quote = QuickOrderPricer::new(&settings)
//!     .price(&[item], &DeliveryLocation::default())
//!     .unwrap();
//!
//! assert_eq!(quote.lines[0].unit_price, Money::from_cents(9500));
//! ```
//!
//! # Rounding
//!
//! Amounts are rounded to cents, half away from zero, wherever they are
//! reported: item costs, unit price, discount, shipping, tax, and total.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod discount;
mod error;
mod money;
mod pricer;
mod settings;
mod shipping;

pub use discount::{
    is_student_email, resolve_discount, Discount, DiscountSource, STUDENT_DISCOUNT_PERCENT,
};
pub use error::{PricingError, PricingResult};
pub use money::Money;
pub use pricer::{
    MaterialCatalog, PricedLine, PricedQuote, QuickOrderItem, QuickOrderPricer, QuoteRequest,
};
pub use settings::PricingSettings;
pub use shipping::{DeliveryLocation, ShippingQuote, ShippingRegion, ShippingTable};
