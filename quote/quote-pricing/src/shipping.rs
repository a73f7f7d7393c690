//! Shipping region lookup.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::money::Money;

/// One configured shipping region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRegion {
    /// Short code, e.g. `metro`.
    pub code: String,

    /// Customer-facing label.
    pub label: String,

    /// Flat shipping charge.
    pub amount: Money,

    /// States or provinces served, matched case-insensitively.
    #[serde(default)]
    pub states: Vec<String>,

    /// Postcode prefixes served.
    #[serde(default)]
    pub postcode_prefixes: Vec<String>,

    /// Remote surcharge applies.
    #[serde(default)]
    pub remote: bool,
}

impl ShippingRegion {
    /// A region with no match rules.
    #[must_use]
    pub fn new(code: impl Into<String>, label: impl Into<String>, amount: Money) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            amount,
            states: Vec::new(),
            postcode_prefixes: Vec::new(),
            remote: false,
        }
    }

    /// Add states served.
    #[must_use]
    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Add postcode prefixes served.
    #[must_use]
    pub fn with_postcode_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.postcode_prefixes
            .extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Mark as remote.
    #[must_use]
    pub const fn remote(mut self) -> Self {
        self.remote = true;
        self
    }

    fn matches(&self, location: &DeliveryLocation) -> bool {
        let postcode = location.postcode.as_deref().map(normalize_postcode);
        if let Some(postcode) = postcode.filter(|p| !p.is_empty()) {
            if self
                .postcode_prefixes
                .iter()
                .map(|p| normalize_postcode(p))
                .any(|prefix| !prefix.is_empty() && postcode.starts_with(&prefix))
            {
                return true;
            }
        }

        let state = location.state.as_deref().map(str::trim);
        state.filter(|s| !s.is_empty()).is_some_and(|state| {
            self.states
                .iter()
                .any(|s| s.trim().eq_ignore_ascii_case(state))
        })
    }
}

fn normalize_postcode(postcode: &str) -> String {
    postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Where an order is delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryLocation {
    /// State or province.
    pub state: Option<String>,
    /// Postal code.
    pub postcode: Option<String>,
}

impl DeliveryLocation {
    /// A location from optional state and postcode.
    #[must_use]
    pub fn new(state: Option<&str>, postcode: Option<&str>) -> Self {
        Self {
            state: state.map(str::to_owned),
            postcode: postcode.map(str::to_owned),
        }
    }
}

/// Resolved shipping charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingQuote {
    /// Region code.
    pub code: String,
    /// Region label.
    pub label: String,
    /// Charge including any remote surcharge.
    pub amount: Money,
    /// Remote surcharge was added.
    pub remote: bool,
}

/// Ordered shipping regions with a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingTable {
    /// Regions, tried in order.
    pub regions: Vec<ShippingRegion>,

    /// Region used when nothing matches.
    pub default_region: Option<String>,

    /// Added to remote regions.
    pub remote_surcharge: Money,
}

impl ShippingTable {
    /// A table from regions, with no default or surcharge.
    #[must_use]
    pub fn new(regions: Vec<ShippingRegion>) -> Self {
        Self {
            regions,
            ..Default::default()
        }
    }

    /// Set the default region code.
    #[must_use]
    pub fn with_default_region(mut self, code: impl Into<String>) -> Self {
        self.default_region = Some(code.into());
        self
    }

    /// Set the remote surcharge.
    #[must_use]
    pub const fn with_remote_surcharge(mut self, surcharge: Money) -> Self {
        self.remote_surcharge = surcharge;
        self
    }

    /// Resolve the shipping charge for a location.
    ///
    /// The first region whose postcode prefix or state matches wins. With
    /// no match the default region is used, then the first region. Returns
    /// `None` only for an empty table.
    #[must_use]
    pub fn quote(&self, location: &DeliveryLocation) -> Option<ShippingQuote> {
        let region = self
            .regions
            .iter()
            .find(|r| r.matches(location))
            .or_else(|| {
                let code = self.default_region.as_deref()?;
                self.regions.iter().find(|r| r.code == code)
            })
            .or_else(|| self.regions.first())?;

        let amount = if region.remote {
            region.amount + self.remote_surcharge
        } else {
            region.amount
        };

        debug!(code = %region.code, %amount, "resolved shipping region");
        Some(ShippingQuote {
            code: region.code.clone(),
            label: region.label.clone(),
            amount: amount.floor_zero().round_cents(),
            remote: region.remote,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn table() -> ShippingTable {
        ShippingTable::new(vec![
            ShippingRegion::new("metro", "Metro courier", Money::new(dec!(9.95)))
                .with_postcode_prefixes(["20", "21"])
                .with_states(["NSW"]),
            ShippingRegion::new("regional", "Regional post", Money::new(dec!(14.50)))
                .with_states(["VIC", "QLD"]),
            ShippingRegion::new("remote", "Remote freight", Money::new(dec!(25)))
                .with_states(["NT"])
                .with_postcode_prefixes(["08"])
                .remote(),
        ])
        .with_remote_surcharge(Money::new(dec!(10)))
    }

    #[test]
    fn test_postcode_prefix_match() {
        let quote = table()
            .quote(&DeliveryLocation::new(None, Some(" 2150 ")))
            .unwrap();
        assert_eq!(quote.code, "metro");
        assert_eq!(quote.amount, Money::new(dec!(9.95)));
    }

    #[test]
    fn test_state_match_is_case_insensitive() {
        let quote = table()
            .quote(&DeliveryLocation::new(Some("  qld "), None))
            .unwrap();
        assert_eq!(quote.code, "regional");
    }

    #[test]
    fn test_first_matching_region_wins() {
        // Postcode says metro, state says regional: metro is listed first.
        let quote = table()
            .quote(&DeliveryLocation::new(Some("VIC"), Some("2000")))
            .unwrap();
        assert_eq!(quote.code, "metro");
    }

    #[test]
    fn test_remote_surcharge() {
        let quote = table()
            .quote(&DeliveryLocation::new(Some("NT"), None))
            .unwrap();
        assert!(quote.remote);
        assert_eq!(quote.amount, Money::new(dec!(35)));
    }

    #[test]
    fn test_default_region() {
        let quote = table()
            .with_default_region("regional")
            .quote(&DeliveryLocation::new(Some("WA"), Some("6000")))
            .unwrap();
        assert_eq!(quote.code, "regional");
    }

    #[test]
    fn test_first_region_when_default_missing() {
        let quote = table()
            .with_default_region("nowhere")
            .quote(&DeliveryLocation::default())
            .unwrap();
        assert_eq!(quote.code, "metro");
    }

    #[test]
    fn test_empty_table() {
        assert!(ShippingTable::default()
            .quote(&DeliveryLocation::new(Some("NSW"), None))
            .is_none());
    }

    #[test]
    fn test_table_from_json() {
        let table: ShippingTable = serde_json::from_str(
            r#"{
                "regions": [
                    {"code": "local", "label": "Pickup", "amount": 0},
                    {"code": "far", "label": "Freight", "amount": "30.00", "states": ["TAS"], "remote": true}
                ],
                "default_region": "local",
                "remote_surcharge": 5
            }"#,
        )
        .unwrap();
        let quote = table
            .quote(&DeliveryLocation::new(Some("tas"), None))
            .unwrap();
        assert_eq!(quote.amount, Money::new(dec!(35)));
    }
}
