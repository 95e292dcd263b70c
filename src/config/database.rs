//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Both `SQLite` and Postgres URLs work.

use crate::entities::Price;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{info, instrument};

/// Default database location when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/prices.sqlite?mode=rwc";

/// Establishes a connection to the database at `database_url`.
#[instrument(skip(database_url))]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    info!("Connected to {:?} database", db.get_database_backend());
    Ok(db)
}

/// Creates the `prices` table if it does not exist yet.
///
/// Safe to call on every start.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut price_table = schema.create_table_from_entity(Price);
    price_table.if_not_exists();

    db.execute(builder.build(&price_table)).await?;

    Ok(())
}
