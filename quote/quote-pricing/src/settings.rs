//! Business settings for pricing.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::shipping::ShippingTable;

/// Rates, fees, shipping, and material costs.
///
/// All fields default to zero or empty, so settings files only need the
/// values a shop actually charges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Machine time charge per hour.
    pub hourly_rate: Money,

    /// Per-unit setup fee.
    pub setup_fee: Money,

    /// Floor for the unit price.
    pub minimum_price: Money,

    /// Tax rate as a fraction (`0.1` for 10%).
    pub tax_rate: Decimal,

    /// Shipping regions.
    pub shipping: ShippingTable,

    /// Cost per gram, by material id.
    pub materials: HashMap<String, Money>,
}

impl PricingSettings {
    /// Set the hourly machine rate.
    #[must_use]
    pub const fn with_hourly_rate(mut self, rate: Money) -> Self {
        self.hourly_rate = rate;
        self
    }

    /// Set the setup fee.
    #[must_use]
    pub const fn with_setup_fee(mut self, fee: Money) -> Self {
        self.setup_fee = fee;
        self
    }

    /// Set the minimum unit price.
    #[must_use]
    pub const fn with_minimum_price(mut self, price: Money) -> Self {
        self.minimum_price = price;
        self
    }

    /// Set the tax rate (fraction).
    #[must_use]
    pub const fn with_tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Set the shipping table.
    #[must_use]
    pub fn with_shipping(mut self, shipping: ShippingTable) -> Self {
        self.shipping = shipping;
        self
    }

    /// Add a material and its cost per gram.
    #[must_use]
    pub fn with_material(mut self, id: impl Into<String>, cost_per_gram: Money) -> Self {
        self.materials.insert(id.into(), cost_per_gram);
        self
    }
}
