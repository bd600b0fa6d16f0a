//! Feed type — a finite, shared feed stock with a unit of measure.
//!
//! `remaining_quantity` is the only mutable field and is only ever changed
//! through the inventory ledger's reserve/release operations.

use serde::{Deserialize, Serialize};

use crate::error::{FeedlotError, ValidationError};
use crate::id::FeedTypeId;

/// A category of feed stock (e.g. "Layer Feed", unit "kg").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedType {
    pub id: FeedTypeId,
    pub name: String,
    pub unit: String,
    pub total_quantity: f64,
    pub remaining_quantity: f64,
}

impl FeedType {
    /// Create a builder for constructing a [`FeedType`].
    #[must_use]
    pub fn builder() -> FeedTypeBuilder {
        FeedTypeBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::Validation`] when `name` or `unit` is empty,
    /// `total_quantity` is not positive, or `remaining_quantity` falls
    /// outside `0..=total_quantity`.
    pub fn validate(&self) -> Result<(), FeedlotError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.unit.is_empty() {
            return Err(ValidationError::EmptyUnit.into());
        }
        if self.total_quantity <= 0.0 {
            return Err(ValidationError::NonPositiveQuantity.into());
        }
        if self.remaining_quantity < 0.0 || self.remaining_quantity > self.total_quantity {
            return Err(ValidationError::RemainingOutOfRange.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`FeedType`].
#[derive(Debug, Default)]
pub struct FeedTypeBuilder {
    id: Option<FeedTypeId>,
    name: Option<String>,
    unit: Option<String>,
    total_quantity: Option<f64>,
    remaining_quantity: Option<f64>,
}

impl FeedTypeBuilder {
    #[must_use]
    pub fn id(mut self, id: FeedTypeId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn total_quantity(mut self, total: f64) -> Self {
        self.total_quantity = Some(total);
        self
    }

    #[must_use]
    pub fn remaining_quantity(mut self, remaining: f64) -> Self {
        self.remaining_quantity = Some(remaining);
        self
    }

    /// Consume the builder, validate, and return a [`FeedType`].
    ///
    /// A fresh stock starts full: `remaining_quantity` defaults to
    /// `total_quantity` when not given.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::Validation`] if invariants fail.
    pub fn build(self) -> Result<FeedType, FeedlotError> {
        let total = self.total_quantity.unwrap_or_default();
        let feed = FeedType {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            unit: self.unit.unwrap_or_default(),
            total_quantity: total,
            remaining_quantity: self.remaining_quantity.unwrap_or(total),
        };
        feed.validate()?;
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_valid_feed_type_with_full_stock() {
        let feed = FeedType::builder()
            .name("Layer Feed")
            .unit("kg")
            .total_quantity(50.0)
            .build()
            .unwrap();
        assert_eq!(feed.name, "Layer Feed");
        assert_eq!(feed.remaining_quantity, 50.0);
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = FeedType::builder().unit("kg").total_quantity(10.0).build();
        assert!(matches!(
            result,
            Err(FeedlotError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_unit_is_empty() {
        let result = FeedType::builder()
            .name("Pellets")
            .total_quantity(10.0)
            .build();
        assert!(matches!(
            result,
            Err(FeedlotError::Validation(ValidationError::EmptyUnit))
        ));
    }

    #[test]
    fn should_reject_remaining_above_total() {
        let result = FeedType::builder()
            .name("Pellets")
            .unit("kg")
            .total_quantity(10.0)
            .remaining_quantity(12.0)
            .build();
        assert!(matches!(
            result,
            Err(FeedlotError::Validation(
                ValidationError::RemainingOutOfRange
            ))
        ));
    }

    #[test]
    fn should_reject_non_positive_total() {
        let result = FeedType::builder().name("Pellets").unit("kg").build();
        assert!(matches!(
            result,
            Err(FeedlotError::Validation(
                ValidationError::NonPositiveQuantity
            ))
        ));
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let feed = FeedType::builder()
            .name("Corn")
            .unit("kg")
            .total_quantity(100.0)
            .remaining_quantity(40.0)
            .build()
            .unwrap();
        let json = serde_json::to_string(&feed).unwrap();
        let parsed: FeedType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, feed.id);
        assert_eq!(parsed.remaining_quantity, 40.0);
    }
}
