//! Itemized quotes for quick orders.

use std::collections::HashMap;
use std::fmt;

use mesh_slice::{SliceMetrics, SliceSettings};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::discount::{resolve_discount, Discount, DiscountSource};
use crate::error::{PricingError, PricingResult};
use crate::money::Money;
use crate::settings::PricingSettings;
use crate::shipping::{DeliveryLocation, ShippingQuote};

const SECONDS_PER_HOUR: Decimal = Decimal::from_parts(3600, 0, 0, false, 0);

/// Source of per-gram material costs.
pub trait MaterialCatalog {
    /// Cost per gram of a material, or `None` if unknown.
    fn cost_per_gram(&self, id: &str) -> Option<Money>;
}

impl MaterialCatalog for HashMap<String, Money> {
    fn cost_per_gram(&self, id: &str) -> Option<Money> {
        self.get(id).copied()
    }
}

impl MaterialCatalog for PricingSettings {
    fn cost_per_gram(&self, id: &str) -> Option<Money> {
        self.materials.cost_per_gram(id)
    }
}

/// One model in a quick order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickOrderItem {
    /// Opaque id of the uploaded model.
    pub mesh_id: String,

    /// Primary material id.
    pub material: String,

    /// Support material id; the primary material when absent.
    #[serde(default)]
    pub support_material: Option<String>,

    /// Settings the model was sliced with.
    #[serde(default)]
    pub settings: SliceSettings,

    /// Copies ordered.
    pub quantity: u32,

    /// Slicer estimate for one copy.
    pub metrics: SliceMetrics,

    /// Support mass for one copy (g), from the overhang analysis.
    #[serde(default)]
    pub support_grams: f64,
}

impl QuickOrderItem {
    /// One copy of a model in a single material.
    #[must_use]
    pub fn new(mesh_id: impl Into<String>, material: impl Into<String>, metrics: SliceMetrics) -> Self {
        Self {
            mesh_id: mesh_id.into(),
            material: material.into(),
            support_material: None,
            settings: SliceSettings::default(),
            quantity: 1,
            metrics,
            support_grams: 0.0,
        }
    }

    /// Set the quantity.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the support mass.
    #[must_use]
    pub const fn with_support_grams(mut self, grams: f64) -> Self {
        self.support_grams = grams;
        self
    }

    /// Print supports in a different material.
    #[must_use]
    pub fn with_support_material(mut self, material: impl Into<String>) -> Self {
        self.support_material = Some(material.into());
        self
    }

    /// Set the slice settings.
    #[must_use]
    pub fn with_settings(mut self, settings: SliceSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// A full quote request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteRequest {
    /// Items to price.
    pub items: Vec<QuickOrderItem>,

    /// Delivery location.
    pub location: DeliveryLocation,

    /// Requester email, for student eligibility.
    pub requester_email: Option<String>,

    /// Explicitly requested discount.
    pub discount: Option<Discount>,
}

/// Price breakdown of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLine {
    /// Model id.
    pub mesh_id: String,
    /// Primary material id.
    pub material: String,
    /// Copies.
    pub quantity: u32,
    /// Model mass per copy (g).
    pub model_grams: f64,
    /// Support mass per copy (g).
    pub support_grams: f64,
    /// Print time per copy (s).
    pub time_seconds: f64,
    /// Slicer estimate was a fallback.
    pub estimated: bool,
    /// Material cost per copy.
    pub material_cost: Money,
    /// Machine time cost per copy.
    pub time_cost: Money,
    /// Price per copy.
    pub unit_price: Money,
    /// `unit_price × quantity`.
    pub line_total: Money,
}

/// Priced order. Re-pricing produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedQuote {
    /// One line per item, in order.
    pub lines: Vec<PricedLine>,
    /// Sum of line totals.
    pub subtotal: Money,
    /// Discount applied.
    pub discount: Money,
    /// Where the discount came from.
    pub discount_source: DiscountSource,
    /// Subtotal after discount.
    pub discounted_subtotal: Money,
    /// Resolved shipping, if any regions are configured.
    pub shipping: Option<ShippingQuote>,
    /// Tax on discounted subtotal plus shipping.
    pub tax: Money,
    /// Grand total.
    pub total: Money,
}

impl PricedQuote {
    /// Shipping charge, zero when no region applies.
    #[must_use]
    pub fn shipping_amount(&self) -> Money {
        self.shipping.as_ref().map_or(Money::ZERO, |s| s.amount)
    }

    /// Total copies across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

/// Prices quick orders from slicer metrics and business settings.
pub struct QuickOrderPricer<'a> {
    settings: &'a PricingSettings,
    catalog: &'a dyn MaterialCatalog,
}

impl fmt::Debug for QuickOrderPricer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuickOrderPricer")
            .field("settings", self.settings)
            .finish_non_exhaustive()
    }
}

impl<'a> QuickOrderPricer<'a> {
    /// Pricer using the settings' own material table.
    #[must_use]
    pub fn new(settings: &'a PricingSettings) -> Self {
        Self {
            settings,
            catalog: settings,
        }
    }

    /// Pricer with a separate material catalog.
    #[must_use]
    pub fn with_catalog(settings: &'a PricingSettings, catalog: &'a dyn MaterialCatalog) -> Self {
        Self { settings, catalog }
    }

    /// Price items for delivery to `location`, with no discount.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NoItems`] for an empty order,
    /// [`PricingError::UnknownMaterial`] for a material missing from the
    /// catalog, and [`PricingError::InvalidItem`] for a zero quantity or
    /// non-finite metrics.
    pub fn price(
        &self,
        items: &[QuickOrderItem],
        location: &DeliveryLocation,
    ) -> PricingResult<PricedQuote> {
        self.price_with(items, location, Discount::None, DiscountSource::None)
    }

    /// Price a request, resolving requested and student discounts.
    ///
    /// # Errors
    ///
    /// As for [`price`](Self::price).
    pub fn price_request(&self, request: &QuoteRequest) -> PricingResult<PricedQuote> {
        let (discount, source) =
            resolve_discount(request.discount, request.requester_email.as_deref());
        self.price_with(&request.items, &request.location, discount, source)
    }

    /// Price a single item.
    ///
    /// # Errors
    ///
    /// As for [`price`](Self::price), with `index` reported in
    /// [`PricingError::InvalidItem`].
    pub fn price_item(&self, index: usize, item: &QuickOrderItem) -> PricingResult<PricedLine> {
        if item.quantity == 0 {
            return Err(PricingError::invalid_item(index, "quantity is zero"));
        }
        let model_grams = non_negative(index, "model grams", item.metrics.material_grams)?;
        let support_grams = non_negative(index, "support grams", item.support_grams)?;
        let time_seconds = non_negative(index, "print time", item.metrics.time_seconds)?;

        let primary = self.cost_per_gram(&item.material)?;
        let support = match &item.support_material {
            Some(id) => self.cost_per_gram(id)?,
            None => primary,
        };

        let material_cost = times(index, primary, model_grams)?
            .checked_add(times(index, support, support_grams)?)
            .ok_or_else(|| too_large(index))?
            .round_cents();

        let hours = Decimal::try_from(time_seconds)
            .map_err(|_| PricingError::invalid_item(index, "print time is not representable"))?
            / SECONDS_PER_HOUR;
        let time_cost = self
            .settings
            .hourly_rate
            .checked_mul(hours)
            .ok_or_else(|| too_large(index))?
            .round_cents();

        let unit_price = self
            .settings
            .setup_fee
            .checked_add(material_cost)
            .and_then(|m| m.checked_add(time_cost))
            .ok_or_else(|| too_large(index))?
            .max(self.settings.minimum_price)
            .floor_zero()
            .round_cents();
        let line_total = unit_price
            .checked_mul(Decimal::from(item.quantity))
            .ok_or_else(|| too_large(index))?;

        debug!(
            mesh = %item.mesh_id,
            %material_cost,
            %time_cost,
            %unit_price,
            quantity = item.quantity,
            "priced item"
        );

        Ok(PricedLine {
            mesh_id: item.mesh_id.clone(),
            material: item.material.clone(),
            quantity: item.quantity,
            model_grams,
            support_grams,
            time_seconds,
            estimated: item.metrics.fallback,
            material_cost,
            time_cost,
            unit_price,
            line_total,
        })
    }

    fn price_with(
        &self,
        items: &[QuickOrderItem],
        location: &DeliveryLocation,
        discount: Discount,
        discount_source: DiscountSource,
    ) -> PricingResult<PricedQuote> {
        if items.is_empty() {
            return Err(PricingError::NoItems);
        }
        info!(items = items.len(), ?discount_source, "pricing quick order");

        let lines = items
            .iter()
            .enumerate()
            .map(|(index, item)| self.price_item(index, item))
            .collect::<PricingResult<Vec<_>>>()?;

        let subtotal = lines
            .iter()
            .try_fold(Money::ZERO, |acc, l| acc.checked_add(l.line_total))
            .ok_or(PricingError::Overflow)?;
        let discount_amount = discount.amount_off(subtotal);
        let discounted_subtotal = (subtotal - discount_amount).floor_zero();

        let shipping = self.settings.shipping.quote(location);
        let shipping_amount = shipping.as_ref().map_or(Money::ZERO, |s| s.amount);

        let taxable = discounted_subtotal
            .checked_add(shipping_amount)
            .ok_or(PricingError::Overflow)?
            .floor_zero();
        let tax = taxable
            .checked_mul(self.settings.tax_rate)
            .ok_or(PricingError::Overflow)?
            .floor_zero()
            .round_cents();
        let total = taxable
            .checked_add(tax)
            .ok_or(PricingError::Overflow)?
            .floor_zero()
            .round_cents();

        let discount_source = if discount_amount == Money::ZERO {
            DiscountSource::None
        } else {
            discount_source
        };

        info!(%subtotal, discount = %discount_amount, %tax, %total, "quick order priced");

        Ok(PricedQuote {
            lines,
            subtotal,
            discount: discount_amount,
            discount_source,
            discounted_subtotal,
            shipping,
            tax,
            total,
        })
    }

    fn cost_per_gram(&self, id: &str) -> PricingResult<Money> {
        self.catalog
            .cost_per_gram(id)
            .ok_or_else(|| PricingError::UnknownMaterial { id: id.to_string() })
    }
}

fn non_negative(index: usize, what: &str, value: f64) -> PricingResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PricingError::invalid_item(
            index,
            format!("{what} must be finite and non-negative, got {value}"),
        ))
    }
}

fn times(index: usize, cost: Money, quantity: f64) -> PricingResult<Money> {
    cost.times_f64(quantity)
        .ok_or_else(|| PricingError::invalid_item(index, "quantity is not representable"))
}

fn too_large(index: usize) -> PricingError {
    PricingError::invalid_item(index, "price is too large to represent")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shipping::{ShippingRegion, ShippingTable};
    use rust_decimal_macros::dec;

    fn money(d: Decimal) -> Money {
        Money::new(d)
    }

    fn settings() -> PricingSettings {
        PricingSettings::default()
            .with_hourly_rate(money(dec!(50)))
            .with_setup_fee(money(dec!(10)))
            .with_minimum_price(money(dec!(20)))
            .with_material("pla", money(dec!(0.5)))
            .with_material("pva", money(dec!(1.0)))
    }

    fn item(grams: f64, seconds: f64) -> QuickOrderItem {
        QuickOrderItem::new("part-1", "pla", SliceMetrics::sliced(seconds, grams, None))
    }

    #[test]
    fn test_worked_example() {
        let settings = settings();
        let pricer = QuickOrderPricer::new(&settings);
        let order = [item(50.0, 3600.0)
            .with_support_grams(10.0)
            .with_support_material("pva")];

        let quote = pricer.price(&order, &DeliveryLocation::default()).unwrap();
        let line = &quote.lines[0];
        assert_eq!(line.material_cost, money(dec!(35)));
        assert_eq!(line.time_cost, money(dec!(50)));
        assert_eq!(line.unit_price, money(dec!(95)));
        assert_eq!(quote.total, money(dec!(95)));
    }

    #[test]
    fn test_material_cost_without_supports() {
        let settings = settings();
        let line = QuickOrderPricer::new(&settings)
            .price_item(0, &item(37.5, 0.0))
            .unwrap();
        assert_eq!(line.material_cost, money(dec!(18.75)));
    }

    #[test]
    fn test_supports_default_to_primary_material() {
        let settings = settings();
        let line = QuickOrderPricer::new(&settings)
            .price_item(0, &item(10.0, 0.0).with_support_grams(4.0))
            .unwrap();
        assert_eq!(line.material_cost, money(dec!(7)));
    }

    #[test]
    fn test_minimum_price_floor() {
        let settings = settings();
        let line = QuickOrderPricer::new(&settings)
            .price_item(0, &item(1.0, 60.0).with_quantity(3))
            .unwrap();
        // 10 + 0.5 + 0.83 is under the 20 minimum.
        assert_eq!(line.unit_price, money(dec!(20)));
        assert_eq!(line.line_total, money(dec!(60)));
    }

    #[test]
    fn test_empty_order() {
        let settings = settings();
        let err = QuickOrderPricer::new(&settings)
            .price(&[], &DeliveryLocation::default())
            .unwrap_err();
        assert_eq!(err, PricingError::NoItems);
    }

    #[test]
    fn test_unknown_material() {
        let settings = settings();
        let order = [item(10.0, 60.0).with_support_material("nylon")];
        let err = QuickOrderPricer::new(&settings)
            .price(&order, &DeliveryLocation::default())
            .unwrap_err();
        assert_eq!(err, PricingError::UnknownMaterial { id: "nylon".into() });
    }

    #[test]
    fn test_invalid_items() {
        let settings = settings();
        let pricer = QuickOrderPricer::new(&settings);
        assert!(matches!(
            pricer.price_item(4, &item(10.0, 60.0).with_quantity(0)),
            Err(PricingError::InvalidItem { index: 4, .. })
        ));
        assert!(matches!(
            pricer.price_item(0, &item(f64::NAN, 60.0)),
            Err(PricingError::InvalidItem { .. })
        ));
        assert!(matches!(
            pricer.price_item(0, &item(10.0, -1.0)),
            Err(PricingError::InvalidItem { .. })
        ));
    }

    #[test]
    fn test_oversized_figures_are_rejected() {
        let settings = settings().with_material("steel", money(dec!(2)));
        let pricer = QuickOrderPricer::new(&settings);
        let heavy = |grams: f64| {
            QuickOrderItem::new("ingot", "steel", SliceMetrics::sliced(0.0, grams, None))
        };

        assert!(matches!(
            pricer.price_item(1, &heavy(5e28)),
            Err(PricingError::InvalidItem { index: 1, .. })
        ));
        assert!(matches!(
            pricer.price_item(2, &heavy(1e28).with_quantity(10)),
            Err(PricingError::InvalidItem { index: 2, .. })
        ));

        let order = [heavy(2e28), heavy(2e28)];
        assert!(matches!(
            pricer.price(&order, &DeliveryLocation::default()),
            Err(PricingError::Overflow)
        ));
    }

    #[test]
    fn test_separate_catalog() {
        let settings = settings();
        let mut catalog: HashMap<String, Money> = HashMap::new();
        catalog.insert("resin".into(), money(dec!(0.2)));
        let pricer = QuickOrderPricer::with_catalog(&settings, &catalog);

        let order = [QuickOrderItem::new(
            "mini",
            "resin",
            SliceMetrics::sliced(0.0, 100.0, None),
        )];
        let line = &pricer.price(&order, &DeliveryLocation::default()).unwrap().lines[0];
        assert_eq!(line.material_cost, money(dec!(20)));
    }

    #[test]
    fn test_order_totals_with_tax_and_shipping() {
        let settings = settings()
            .with_tax_rate(dec!(0.1))
            .with_shipping(ShippingTable::new(vec![ShippingRegion::new(
                "flat",
                "Flat rate",
                money(dec!(5)),
            )]));
        let pricer = QuickOrderPricer::new(&settings);
        let order = [item(50.0, 3600.0).with_quantity(2)];

        let quote = pricer.price(&order, &DeliveryLocation::default()).unwrap();
        // Unit 10 + 25 + 50 = 85, two copies.
        assert_eq!(quote.subtotal, money(dec!(170)));
        assert_eq!(quote.shipping_amount(), money(dec!(5)));
        assert_eq!(quote.tax, money(dec!(17.5)));
        assert_eq!(quote.total, money(dec!(192.5)));
        assert_eq!(quote.unit_count(), 2);
    }

    #[test]
    fn test_student_discount_applies_to_request() {
        let settings = settings();
        let request = QuoteRequest {
            items: vec![item(50.0, 3600.0)],
            requester_email: Some("ada@uni.edu".into()),
            ..Default::default()
        };
        let quote = QuickOrderPricer::new(&settings)
            .price_request(&request)
            .unwrap();
        assert_eq!(quote.discount_source, DiscountSource::Student);
        assert_eq!(quote.discount, money(dec!(19)));
        assert_eq!(quote.discounted_subtotal, money(dec!(76)));
        assert_eq!(quote.total, money(dec!(76)));
    }

    #[test]
    fn test_fallback_metrics_are_flagged() {
        let settings = settings();
        let order = [QuickOrderItem::new("p", "pla", SliceMetrics::fallback())];
        let quote = QuickOrderPricer::new(&settings)
            .price(&order, &DeliveryLocation::default())
            .unwrap();
        assert!(quote.lines[0].estimated);
        // 10 + 80 × 0.5 + 50.
        assert_eq!(quote.lines[0].unit_price, money(dec!(100)));
    }
}
