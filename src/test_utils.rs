//! Shared test utilities for the price catalog.
//!
//! Helpers for setting up in-memory test databases, building ZIP bundles and
//! creating records with sensible defaults.

use std::io::{Cursor, Write};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;
use zip::{ZipWriter, write::SimpleFileOptions};

use crate::{errors::Result, models::PriceRecord};

/// Installs a tracing subscriber that writes through the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with the `prices` table initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a record with sensible defaults.
///
/// # Defaults
/// * `name`: `"Item <id>"`
/// * `created_at`: 2024-01-15
#[allow(clippy::unwrap_used)]
pub fn sample_record(id: &str, category: &str, price: Decimal) -> PriceRecord {
    PriceRecord {
        id: id.to_string(),
        name: format!("Item {id}"),
        category: category.to_string(),
        price,
        created_at: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
    }
}

/// Builds a ZIP bundle from `(entry name, contents)` pairs, in order.
/// Names ending in `/` become directory entries.
#[allow(clippy::unwrap_used)]
pub fn build_bundle(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Builds a `multipart/form-data` body with a single file part.
/// Returns `(content type header, body)`.
pub fn multipart_body(field: &str, file_name: &str, contents: &[u8]) -> (String, Vec<u8>) {
    let boundary = "price-catalog-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/zip\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}
