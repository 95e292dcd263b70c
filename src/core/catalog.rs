//! Catalog import/export - Wires the archive adapter, table pipeline and gateway into the
//! two end-to-end flows.
//!
//! Upload: bundle → first CSV table → validated records → transactional insert → summary.
//! Download: all records → CSV table → single-entry bundle.

use tracing::{info, instrument};

use crate::{
    core::{
        archive,
        gateway::{PriceGateway, TotalsReader},
        table::{self, DiscardedRow},
    },
    errors::Result,
    models::ImportSummary,
};

/// Everything an import produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Counts and post-import catalog totals
    pub summary: ImportSummary,
    /// Rows dropped during validation
    pub discarded: Vec<DiscardedRow>,
}

/// Imports an uploaded ZIP bundle into the catalog.
///
/// Decompression and CSV parsing run on the blocking pool, and the table is never
/// decompressed past `max_table_bytes`. Rejected rows never fail the import; they are
/// returned in [`ImportOutcome::discarded`].
///
/// # Errors
/// - [`crate::errors::Error::Archive`] if the bundle is unreadable, holds no CSV table, or
///   the table is too large; the store is not touched
/// - [`crate::errors::Error::Persistence`] if the import transaction fails
#[instrument(skip(gateway, bundle), fields(bundle_len = bundle.len()))]
pub async fn import_bundle<T: TotalsReader>(
    gateway: &PriceGateway<T>,
    bundle: Vec<u8>,
    max_table_bytes: u64,
) -> Result<ImportOutcome> {
    let processed = tokio::task::spawn_blocking(move || -> Result<table::ProcessedTable> {
        let entry = archive::extract_table(&bundle, max_table_bytes)?;
        Ok(table::process_table(entry.contents.as_slice()))
    })
    .await??;

    let summary = gateway.import_batch(&processed.records).await?;
    if !processed.discarded.is_empty() {
        info!("{} rows were discarded during import", processed.discarded.len());
    }
    Ok(ImportOutcome {
        summary,
        discarded: processed.discarded,
    })
}

/// Exports the whole catalog as a ZIP bundle holding one `data.csv` table.
///
/// # Errors
/// Returns an error if the query, CSV encoding, or packaging fails. No partial bundle is
/// ever produced.
#[instrument(skip(gateway))]
pub async fn export_bundle<T: TotalsReader>(gateway: &PriceGateway<T>) -> Result<Vec<u8>> {
    let records = gateway.export_all().await?;
    let count = records.len();
    let bundle = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
        let csv = table::write_table(&records)?;
        Ok(archive::package_table(&csv)?)
    })
    .await??;
    info!("Exported {} records ({} bytes)", count, bundle.len());
    Ok(bundle)
}
