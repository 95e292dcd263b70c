//! Table pipeline - Turns a raw CSV table into validated records, and records back into
//! a CSV table.
//!
//! Reading never aborts on a bad row: each rejected row lands in the discard log with its
//! line number and reason, and the rest of the table is still processed. The first line
//! is always the header and is never validated as data.

use std::io::Read;

use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim, WriterBuilder};
use tracing::{debug, instrument, warn};

use crate::{
    core::codec,
    errors::{Result, RowError},
    models::PriceRecord,
};

/// Header written at the top of every exported table.
pub const EXPORT_HEADER: [&str; codec::FIELD_COUNT] =
    ["id", "name", "category", "price", "create_date"];

/// A row that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardedRow {
    /// 1-based line number in the table (the header is line 1)
    pub line: u64,
    /// Row fields joined with commas, for logs. Invalid UTF-8 is replaced with U+FFFD;
    /// a row the reader could not split records its byte offset instead.
    pub raw: String,
    /// Why the row was dropped
    pub error: RowError,
}

/// Output of [`process_table`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessedTable {
    /// Rows that decoded cleanly, in table order
    pub records: Vec<PriceRecord>,
    /// Rows that were dropped
    pub discarded: Vec<DiscardedRow>,
}

/// Reads a CSV table, skipping the header and decoding every following row.
///
/// Duplicate ids are kept; the store's insert-or-skip policy settles them.
#[instrument(skip(reader))]
pub fn process_table<R: Read>(reader: R) -> ProcessedTable {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut table = ProcessedTable::default();
    let mut record = ByteRecord::new();
    loop {
        let line = csv_reader.position().line();
        match csv_reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let line = record.position().map_or(line, csv::Position::line);
                match StringRecord::from_byte_record(record.clone()) {
                    Ok(text) => {
                        let fields: Vec<&str> = text.iter().collect();
                        match codec::decode(&fields) {
                            Ok(price) => table.records.push(price),
                            Err(error) => table.discard(line, fields.join(","), error),
                        }
                    }
                    Err(e) => {
                        let reason = e.utf8_error().to_string();
                        let raw = lossy_join(&e.into_byte_record());
                        table.discard(line, raw, RowError::Unreadable { reason });
                    }
                }
            }
            Err(e) => {
                let position = e.position().cloned();
                let line = position.as_ref().map_or(line, csv::Position::line);
                let raw = position.map_or_else(String::new, |p| format!("<byte {}>", p.byte()));
                table.discard(line, raw, RowError::Unreadable { reason: e.to_string() });
                // Only a record-level failure is recoverable; I/O errors end the table.
                if e.is_io_error() {
                    warn!("Stopped reading table at line {}", line);
                    break;
                }
            }
        }
    }

    debug!(
        "Processed table: {} valid rows, {} discarded",
        table.records.len(),
        table.discarded.len()
    );
    table
}

fn lossy_join(record: &ByteRecord) -> String {
    record
        .iter()
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(",")
}

impl ProcessedTable {
    fn discard(&mut self, line: u64, raw: String, error: RowError) {
        warn!("Discarding row at line {}: {} ({})", line, error, raw);
        self.discarded.push(DiscardedRow { line, raw, error });
    }
}

/// Writes records as a CSV table headed by [`EXPORT_HEADER`].
///
/// # Errors
/// Returns an error if the CSV writer fails to serialize or flush a row.
#[instrument(skip(records), fields(count = records.len()))]
pub fn write_table(records: &[PriceRecord]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;
    for record in records {
        writer.write_record(codec::encode(record))?;
    }
    Ok(writer.into_inner()?)
}
