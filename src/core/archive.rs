//! Archive adapter - Pulls the CSV table out of an uploaded ZIP bundle and packs an
//! exported table back into one.
//!
//! Only one table per bundle is read: the first entry, in central directory order,
//! whose name ends in `.csv`. Every other entry is ignored.

use std::io::{Cursor, Read, Write};

use tracing::{debug, instrument};
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter, write::SimpleFileOptions};

use crate::errors::ArchiveError;

/// Entry name used for the table inside an exported bundle.
pub const EXPORT_ENTRY_NAME: &str = "data.csv";

/// File name offered to clients downloading the bundle.
pub const EXPORT_FILE_NAME: &str = "data.zip";

/// A table located inside an uploaded bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    /// Entry path inside the bundle
    pub name: String,
    /// Decompressed entry contents
    pub contents: Vec<u8>,
}

fn is_table_entry(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("csv"))
}

/// Extracts the first CSV table from a ZIP bundle.
///
/// # Errors
/// - [`ArchiveError::CorruptArchive`] if the bytes are not a readable ZIP container or
///   the selected entry fails to decompress
/// - [`ArchiveError::NoTableFound`] if no entry has a `.csv` extension
/// - [`ArchiveError::TableTooLarge`] if the table decompresses to more than
///   `max_table_bytes`
#[instrument(skip(bundle), fields(bundle_len = bundle.len()))]
pub fn extract_table(bundle: &[u8], max_table_bytes: u64) -> Result<TableEntry, ArchiveError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bundle)).map_err(ArchiveError::CorruptArchive)?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(ArchiveError::CorruptArchive)?;
        if entry.is_dir() || !is_table_entry(entry.name()) {
            debug!("Skipping archive entry '{}'", entry.name());
            continue;
        }

        let too_large = ArchiveError::TableTooLarge {
            limit: max_table_bytes,
        };
        if entry.size() > max_table_bytes {
            return Err(too_large);
        }

        // The declared size may lie; never decompress past the limit.
        let name = entry.name().to_string();
        let mut contents = Vec::new();
        entry
            .by_ref()
            .take(max_table_bytes.saturating_add(1))
            .read_to_end(&mut contents)
            .map_err(|e| ArchiveError::CorruptArchive(e.into()))?;
        if contents.len() as u64 > max_table_bytes {
            return Err(too_large);
        }
        debug!("Using table '{}' ({} bytes)", name, contents.len());
        return Ok(TableEntry { name, contents });
    }

    Err(ArchiveError::NoTableFound)
}

/// Packages a CSV table as a single-entry ZIP bundle named [`EXPORT_ENTRY_NAME`].
///
/// The entry timestamp is fixed, so the same table always yields the same bytes.
///
/// # Errors
/// [`ArchiveError::Package`] if the ZIP writer fails.
#[instrument(skip(table), fields(table_len = table.len()))]
pub fn package_table(table: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(EXPORT_ENTRY_NAME, options)
        .map_err(ArchiveError::Package)?;
    writer
        .write_all(table)
        .map_err(|e| ArchiveError::Package(e.into()))?;
    let cursor = writer.finish().map_err(ArchiveError::Package)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::build_bundle;

    const LIMIT: u64 = 1024 * 1024;

    #[test]
    fn test_package_then_extract() {
        let table = b"id,name,category,price,create_date\n1,a,b,1.00,2024-01-01\n";
        let bundle = package_table(table).unwrap();

        let entry = extract_table(&bundle, LIMIT).unwrap();
        assert_eq!(entry.name, EXPORT_ENTRY_NAME);
        assert_eq!(entry.contents, table);
    }

    #[test]
    fn test_package_is_deterministic() {
        let table = b"id,name,category,price,create_date\n";
        assert_eq!(package_table(table).unwrap(), package_table(table).unwrap());
    }

    #[test]
    fn test_extract_picks_first_csv_entry() {
        let bundle = build_bundle(&[
            ("readme.txt", b"not a table".as_slice()),
            ("nested/", b"".as_slice()),
            ("nested/first.CSV", b"first".as_slice()),
            ("second.csv", b"second".as_slice()),
        ]);

        let entry = extract_table(&bundle, LIMIT).unwrap();
        assert_eq!(entry.name, "nested/first.CSV");
        assert_eq!(entry.contents, b"first");
    }

    #[test]
    fn test_extract_without_table_entry() {
        let bundle = build_bundle(&[("notes.txt", b"hello".as_slice()), ("csv", b"".as_slice())]);
        assert!(matches!(
            extract_table(&bundle, LIMIT),
            Err(ArchiveError::NoTableFound)
        ));
    }

    #[test]
    fn test_extract_empty_archive() {
        let bundle = build_bundle(&[]);
        assert!(matches!(
            extract_table(&bundle, LIMIT),
            Err(ArchiveError::NoTableFound)
        ));
    }

    #[test]
    fn test_extract_corrupt_bytes() {
        assert!(matches!(
            extract_table(b"definitely not a zip file", LIMIT),
            Err(ArchiveError::CorruptArchive(_))
        ));
        assert!(matches!(
            extract_table(&[], LIMIT),
            Err(ArchiveError::CorruptArchive(_))
        ));
    }

    #[test]
    fn test_is_table_entry() {
        assert!(is_table_entry("data.csv"));
        assert!(is_table_entry("dir/Prices.CsV"));
        assert!(!is_table_entry("data.csv.txt"));
        assert!(!is_table_entry("csv"));
    }

    #[test]
    fn test_extract_rejects_oversized_table() {
        let table = vec![b'0'; 256 * 1024];
        let bundle = build_bundle(&[("bomb.csv", table.as_slice())]);
        assert!(bundle.len() < table.len() / 10);

        assert!(matches!(
            extract_table(&bundle, 64 * 1024),
            Err(ArchiveError::TableTooLarge { limit }) if limit == 64 * 1024
        ));
        let entry = extract_table(&bundle, table.len() as u64).unwrap();
        assert_eq!(entry.contents.len(), table.len());
    }
}
