//! Response composer - Maps an [`ImportSummary`] onto the JSON payload returned by the
//! upload endpoint.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ImportSummary;

/// Outward payload of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResponse {
    /// Rows inserted by this upload
    pub total_items: u64,
    /// Distinct categories across the whole catalog
    pub total_categories: u64,
    /// Sum of all prices in the catalog, as a JSON number
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

/// Field mapping only; no values are recomputed here.
#[must_use]
pub const fn compose(summary: &ImportSummary) -> ImportResponse {
    ImportResponse {
        total_items: summary.inserted_count,
        total_categories: summary.total_categories,
        total_price: summary.total_price,
    }
}

impl From<ImportSummary> for ImportResponse {
    fn from(summary: ImportSummary) -> Self {
        compose(&summary)
    }
}
