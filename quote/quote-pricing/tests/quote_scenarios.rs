//! Whole-order pricing from JSON settings, as the storefront hands them in.

#![allow(clippy::unwrap_used)]

use mesh_slice::SliceMetrics;
use quote_pricing::{
    DeliveryLocation, Discount, DiscountSource, Money, PricingError, PricingSettings,
    QuickOrderItem, QuickOrderPricer, QuoteRequest,
};
use rust_decimal_macros::dec;

const SETTINGS: &str = r#"{
    "hourly_rate": "50",
    "setup_fee": "10",
    "minimum_price": "20",
    "tax_rate": "0.1",
    "materials": {"pla": "0.5", "pva": "1.0", "petg": "0.06"},
    "shipping": {
        "regions": [
            {"code": "metro", "label": "Metro courier", "amount": "9.95", "postcode_prefixes": ["20"]},
            {"code": "regional", "label": "Regional post", "amount": "14.50", "states": ["VIC"]},
            {"code": "remote", "label": "Remote freight", "amount": "25", "states": ["NT"], "remote": true}
        ],
        "default_region": "regional",
        "remote_surcharge": "12.50"
    }
}"#;

fn settings() -> PricingSettings {
    serde_json::from_str(SETTINGS).unwrap()
}

fn bracket() -> QuickOrderItem {
    QuickOrderItem::new("bracket", "pla", SliceMetrics::sliced(3600.0, 50.0, None))
        .with_support_material("pva")
        .with_support_grams(10.0)
}

#[test]
fn worked_example_with_shipping_and_tax() {
    let settings = settings();
    let quote = QuickOrderPricer::new(&settings)
        .price(&[bracket()], &DeliveryLocation::new(None, Some("2042")))
        .unwrap();

    assert_eq!(quote.lines[0].unit_price, Money::new(dec!(95)));
    assert_eq!(quote.shipping.as_ref().unwrap().code, "metro");
    // (95 + 9.95) × 0.1 = 10.495, rounded half away from zero.
    assert_eq!(quote.tax, Money::new(dec!(10.50)));
    assert_eq!(quote.total, Money::new(dec!(115.45)));
}

#[test]
fn distinct_support_material_is_costed_separately() {
    let settings = settings();
    let item = QuickOrderItem::new("gear", "petg", SliceMetrics::sliced(0.0, 200.0, None))
        .with_support_material("pva")
        .with_support_grams(15.0);
    let line = QuickOrderPricer::new(&settings).price_item(0, &item).unwrap();

    // 200 × 0.06 + 15 × 1.0
    assert_eq!(line.material_cost, Money::new(dec!(27)));
}

#[test]
fn unmatched_location_uses_default_region() {
    let settings = settings();
    let quote = QuickOrderPricer::new(&settings)
        .price(&[bracket()], &DeliveryLocation::new(Some("WA"), Some("6000")))
        .unwrap();
    assert_eq!(quote.shipping.unwrap().code, "regional");
}

#[test]
fn remote_region_adds_surcharge() {
    let settings = settings();
    let quote = QuickOrderPricer::new(&settings)
        .price(&[bracket()], &DeliveryLocation::new(Some("nt"), None))
        .unwrap();
    assert_eq!(quote.shipping_amount(), Money::new(dec!(37.50)));
}

#[test]
fn requested_discount_beats_student_discount() {
    let settings = settings();
    let request = QuoteRequest {
        items: vec![bracket()],
        requester_email: Some("lee@eng.uni.edu.au".into()),
        discount: Some(Discount::Fixed(Money::new(dec!(5)))),
        location: DeliveryLocation::new(Some("VIC"), None),
    };
    let quote = QuickOrderPricer::new(&settings)
        .price_request(&request)
        .unwrap();

    assert_eq!(quote.discount_source, DiscountSource::Requested);
    assert_eq!(quote.discount, Money::new(dec!(5)));
    assert_eq!(quote.discounted_subtotal, Money::new(dec!(90)));
}

#[test]
fn oversized_discount_never_goes_negative() {
    let settings = settings();
    let request = QuoteRequest {
        items: vec![bracket()],
        discount: Some(Discount::Fixed(Money::new(dec!(1000)))),
        location: DeliveryLocation::new(Some("VIC"), None),
        ..Default::default()
    };
    let quote = QuickOrderPricer::new(&settings)
        .price_request(&request)
        .unwrap();

    assert_eq!(quote.discounted_subtotal, Money::ZERO);
    // Only shipping and its tax remain.
    assert_eq!(quote.total, Money::new(dec!(15.95)));
}

#[test]
fn empty_request_is_rejected() {
    let settings = settings();
    let err = QuickOrderPricer::new(&settings)
        .price_request(&QuoteRequest::default())
        .unwrap_err();
    assert_eq!(err, PricingError::NoItems);
}

#[test]
fn repricing_gives_identical_quotes() {
    let settings = settings();
    let pricer = QuickOrderPricer::new(&settings);
    let items = [bracket(), bracket().with_quantity(3)];
    let location = DeliveryLocation::new(Some("VIC"), None);

    let first = pricer.price(&items, &location).unwrap();
    let second = pricer.price(&items, &location).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.subtotal, Money::new(dec!(380)));
}

#[test]
fn quote_serializes_to_json() {
    let settings = settings();
    let quote = QuickOrderPricer::new(&settings)
        .price(&[bracket()], &DeliveryLocation::default())
        .unwrap();
    let json = serde_json::to_value(&quote).unwrap();
    let unit_price: Money = serde_json::from_value(json["lines"][0]["unit_price"].clone()).unwrap();
    assert_eq!(unit_price, Money::new(dec!(95)));
    assert_eq!(json["discount_source"], "none");
}
