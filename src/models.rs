//! Domain types shared by the import and export pipelines.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{core::codec::PRICE_SCALE, entities::price};

/// One catalog entry as it travels between the CSV table and the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Opaque external identifier; the natural key for insert-or-skip
    pub id: String,
    /// Non-empty display label
    pub name: String,
    /// Grouping label
    pub category: String,
    /// Non-negative amount with two fractional digits
    pub price: Decimal,
    /// Listing date, no time of day
    pub created_at: NaiveDate,
}

impl From<price::Model> for PriceRecord {
    fn from(model: price::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category: model.category,
            price: Decimal::new(model.price_cents, PRICE_SCALE),
            created_at: model.created_at,
        }
    }
}

impl PriceRecord {
    /// The price as a whole number of cents, or `None` if it does not fit an `i64`.
    #[must_use]
    pub fn price_cents(&self) -> Option<i64> {
        let mut price = self.price;
        price.rescale(PRICE_SCALE);
        i64::try_from(price.mantissa()).ok()
    }
}

/// Totals computed over the whole persisted catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogTotals {
    /// Number of distinct categories
    pub total_categories: u64,
    /// Sum of every price, rounded to two decimal places
    pub total_price: Decimal,
}

/// Result of one import: what this batch added plus the post-import catalog totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Rows actually inserted by this batch (skipped duplicates excluded)
    pub inserted_count: u64,
    /// Distinct categories across the whole store after the import
    pub total_categories: u64,
    /// Sum of prices across the whole store after the import
    pub total_price: Decimal,
}
