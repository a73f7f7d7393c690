//! Error types for quote pricing.

use thiserror::Error;

/// Errors that can occur while pricing an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// Order has no items.
    #[error("Cannot price an order with no items")]
    NoItems,

    /// Material id missing from the catalog.
    #[error("Unknown material: {id}")]
    UnknownMaterial {
        /// The material id that was looked up.
        id: String,
    },

    /// An item cannot be priced.
    #[error("Item {index} is invalid: {reason}")]
    InvalidItem {
        /// Position of the item in the order.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Order totals exceed the representable range.
    #[error("Order total is too large to represent")]
    Overflow,
}

impl PricingError {
    pub(crate) fn invalid_item(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidItem {
            index,
            reason: reason.into(),
        }
    }
}

/// Result type for pricing operations.
pub type PricingResult<T> = std::result::Result<T, PricingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            PricingError::NoItems.to_string(),
            "Cannot price an order with no items"
        );
        let err = PricingError::invalid_item(2, "quantity is zero");
        assert_eq!(err.to_string(), "Item 2 is invalid: quantity is zero");
    }
}
