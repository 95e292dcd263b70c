//! Price entity - One row of the price catalog.
//!
//! The `id` is supplied by whoever uploads the catalog and acts as the natural key:
//! importing a row whose id already exists is a no-op. Prices are stored as a whole
//! number of cents, so no backend ever holds a price as a binary float.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Price database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prices")]
pub struct Model {
    /// Externally supplied identifier, unique across the catalog
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Calendar day the item was listed
    pub created_at: Date,
    /// Display name of the item
    pub name: String,
    /// Grouping label used for the distinct-category total
    pub category: String,
    /// Unit price in hundredths, `BIGINT`
    pub price_cents: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
