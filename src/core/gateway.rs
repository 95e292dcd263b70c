//! Persistence gateway - Owns every read and write against the `prices` table.
//!
//! An import is one database transaction: each record is inserted with
//! `ON CONFLICT (id) DO NOTHING` inside its own savepoint, then the catalog-wide totals
//! are read on the same transaction. Nothing is committed unless the totals read and the
//! commit both succeed, so a failed import leaves the store exactly as it was.

use std::future::Future;

use rust_decimal::Decimal;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryOrder,
    Set, Statement, TransactionTrait, sea_query::OnConflict,
};
use tracing::{error, info, instrument, warn};

use crate::{
    core::codec::PRICE_SCALE,
    entities::{Price, price},
    errors::Result,
    models::{CatalogTotals, ImportSummary, PriceRecord},
};

/// Reads the catalog-wide totals inside an open import transaction.
pub trait TotalsReader: Send + Sync {
    /// Computes distinct category count and summed price over the whole `prices` table.
    fn read_totals(
        &self,
        txn: &DatabaseTransaction,
    ) -> impl Future<Output = std::result::Result<CatalogTotals, DbErr>> + Send;
}

/// Default [`TotalsReader`]: one aggregate query against the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreTotals;

impl TotalsReader for StoreTotals {
    async fn read_totals(
        &self,
        txn: &DatabaseTransaction,
    ) -> std::result::Result<CatalogTotals, DbErr> {
        let row = txn
            .query_one(Statement::from_string(
                txn.get_database_backend(),
                "SELECT COUNT(DISTINCT category) AS total_categories, \
                 CAST(COALESCE(SUM(price_cents), 0) AS BIGINT) AS total_cents \
                 FROM prices",
            ))
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("aggregate row".to_string()))?;

        let total_categories: i64 = row.try_get("", "total_categories")?;
        let total_cents: i64 = row.try_get("", "total_cents")?;
        Ok(CatalogTotals {
            total_categories: u64::try_from(total_categories)
                .map_err(|e| DbErr::Type(e.to_string()))?,
            total_price: Decimal::new(total_cents, PRICE_SCALE),
        })
    }
}

/// Transactional access to the price catalog.
///
/// The database handle is injected; the gateway keeps no other state.
#[derive(Debug, Clone)]
pub struct PriceGateway<T = StoreTotals> {
    db: DatabaseConnection,
    totals: T,
}

impl PriceGateway {
    /// Creates a gateway that reads totals with [`StoreTotals`].
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            totals: StoreTotals,
        }
    }
}

impl<T: TotalsReader> PriceGateway<T> {
    /// Creates a gateway with a custom totals reader.
    #[must_use]
    pub const fn with_totals(db: DatabaseConnection, totals: T) -> Self {
        Self { db, totals }
    }

    /// Inserts a batch of records and returns the post-import catalog totals.
    ///
    /// Records whose id already exists are skipped and not counted. A record that fails
    /// for any other reason is logged, rolled back to its savepoint, and not counted; the
    /// rest of the batch continues.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::Persistence`] if the transaction cannot be opened,
    /// the totals cannot be read, or the commit fails. In every such case none of the
    /// batch's rows are kept.
    #[instrument(skip(self, records), fields(batch = records.len()))]
    pub async fn import_batch(&self, records: &[PriceRecord]) -> Result<ImportSummary> {
        let txn = self.db.begin().await?;

        let mut inserted_count = 0u64;
        for record in records {
            match insert_or_skip(&txn, record).await {
                Ok(rows) => inserted_count += rows,
                Err(e) => warn!("Failed to insert price '{}': {}", record.id, e),
            }
        }

        let totals = match self.totals.read_totals(&txn).await {
            Ok(totals) => totals,
            Err(e) => {
                warn!("Aggregate read failed, rolling back import: {}", e);
                if let Err(rollback_err) = txn.rollback().await {
                    error!("Rollback after failed aggregate read also failed: {}", rollback_err);
                }
                return Err(e.into());
            }
        };
        txn.commit().await?;

        let summary = ImportSummary {
            inserted_count,
            total_categories: totals.total_categories,
            total_price: totals.total_price,
        };
        info!(
            "Imported {} of {} rows; catalog has {} categories totalling {}",
            summary.inserted_count,
            records.len(),
            summary.total_categories,
            summary.total_price
        );
        Ok(summary)
    }

    /// Returns every persisted record, ordered by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn export_all(&self) -> Result<Vec<PriceRecord>> {
        let models = Price::find()
            .order_by_asc(price::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(PriceRecord::from).collect())
    }
}

/// Inserts one record under a savepoint. Returns the number of rows written: 1, or 0
/// when the id already exists.
async fn insert_or_skip(
    txn: &DatabaseTransaction,
    record: &PriceRecord,
) -> std::result::Result<u64, DbErr> {
    let price_cents = record
        .price_cents()
        .ok_or_else(|| DbErr::Type(format!("price {} is out of range", record.price)))?;
    let savepoint = txn.begin().await?;
    let model = price::ActiveModel {
        id: Set(record.id.clone()),
        created_at: Set(record.created_at),
        name: Set(record.name.clone()),
        category: Set(record.category.clone()),
        price_cents: Set(price_cents),
    };

    let result = Price::insert(model)
        .on_conflict(
            OnConflict::column(price::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&savepoint)
        .await;

    match result {
        Ok(rows) => {
            savepoint.commit().await?;
            Ok(rows)
        }
        Err(e) => {
            savepoint.rollback().await?;
            Err(e)
        }
    }
}
