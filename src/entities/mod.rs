//! Entity module - SeaORM entity definitions for the database.
//! The catalog is a single `prices` table; `Model` carries the data and
//! `Entity` the query operations.

pub mod price;

pub use price::{Column as PriceColumn, Entity as Price, Model as PriceModel};
