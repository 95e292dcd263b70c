//! Error types for the price catalog.
//!
//! Three layers: [`RowError`] describes why a single table row was discarded and never
//! leaves the table pipeline, [`ArchiveError`] aborts one import or export request, and
//! [`Error`] is the crate-wide type returned by every fallible operation.

use thiserror::Error;

/// Why a single data row was rejected during import.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// The row does not carry all five fields.
    #[error("row has {found} fields, expected {expected}")]
    MalformedRow {
        /// Number of fields actually present
        found: usize,
        /// Number of fields a price row needs
        expected: usize,
    },

    /// A field that must be non-empty was blank.
    #[error("field '{field}' is empty")]
    MissingField {
        /// Column name of the blank field
        field: &'static str,
    },

    /// The price token is not a non-negative decimal that fits the storage precision.
    #[error("invalid price '{value}'")]
    InvalidPrice {
        /// Raw price token
        value: String,
    },

    /// The date token is not a `YYYY-MM-DD` calendar date.
    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate {
        /// Raw date token
        value: String,
    },

    /// The CSV reader could not produce a record at all (bad quoting, invalid UTF-8).
    #[error("unreadable row: {reason}")]
    Unreadable {
        /// Reader error message
        reason: String,
    },
}

/// Failures opening or producing a compressed bundle.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The uploaded bytes are not a readable ZIP container.
    #[error("corrupt archive: {0}")]
    CorruptArchive(#[source] zip::result::ZipError),

    /// The bundle opened fine but holds no `.csv` entry.
    #[error("no CSV table found in archive")]
    NoTableFound,

    /// The table decompresses to more bytes than an import accepts.
    #[error("CSV table exceeds {limit} bytes when decompressed")]
    TableTooLarge {
        /// Largest accepted decompressed size, in bytes
        limit: u64,
    },

    /// Writing the outgoing bundle failed.
    #[error("failed to package archive: {0}")]
    Package(#[source] zip::result::ZipError),
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Persistence error: {0}")]
    Persistence(#[from] sea_orm::DbErr),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for Error {
    fn from(value: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        Self::Io(value.into_error())
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
