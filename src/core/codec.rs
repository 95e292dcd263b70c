//! Record codec - Converts between the five-field textual row and [`PriceRecord`].
//!
//! Decoding and encoding are exact inverses for any price with at most two fractional
//! digits: prices are written with exactly two digits and dates with [`DATE_FORMAT`].

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{errors::RowError, models::PriceRecord};

/// Number of fields in a price row: id, name, category, price, date.
pub const FIELD_COUNT: usize = 5;

/// Calendar format used for both reading and writing dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fractional digits kept for prices; the store holds whole hundredths.
pub const PRICE_SCALE: u32 = 2;

/// Largest accepted price: ten significant digits, two of them fractional.
const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Decodes one row of text tokens into a record.
///
/// Field count is checked before any field is parsed, so a short row always reports
/// [`RowError::MalformedRow`]. Tokens beyond the fifth are ignored.
///
/// # Errors
/// Returns the first [`RowError`] the row violates.
pub fn decode<S: AsRef<str>>(fields: &[S]) -> Result<PriceRecord, RowError> {
    if fields.len() < FIELD_COUNT {
        return Err(RowError::MalformedRow {
            found: fields.len(),
            expected: FIELD_COUNT,
        });
    }

    let id = fields[0].as_ref().trim();
    if id.is_empty() {
        return Err(RowError::MissingField { field: "id" });
    }
    let name = fields[1].as_ref().trim();
    if name.is_empty() {
        return Err(RowError::MissingField { field: "name" });
    }
    let category = fields[2].as_ref().trim();

    Ok(PriceRecord {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        price: parse_price(fields[3].as_ref())?,
        created_at: parse_date(fields[4].as_ref())?,
    })
}

/// Encodes a record as the five text tokens of one table row.
#[must_use]
pub fn encode(record: &PriceRecord) -> [String; FIELD_COUNT] {
    [
        record.id.clone(),
        record.name.clone(),
        record.category.clone(),
        format_price(record.price),
        format_date(record.created_at),
    ]
}

/// Parses a price token, rounding half away from zero to [`PRICE_SCALE`] digits.
///
/// # Errors
/// [`RowError::InvalidPrice`] when the token is not a decimal number, is negative, or
/// does not fit the storage precision.
pub fn parse_price(token: &str) -> Result<Decimal, RowError> {
    let invalid = || RowError::InvalidPrice {
        value: token.to_string(),
    };
    let trimmed = token.trim();
    let parsed = Decimal::from_str(trimmed).map_err(|_| invalid())?;
    let rounded =
        parsed.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        return Err(invalid());
    }
    if rounded > MAX_PRICE {
        return Err(invalid());
    }
    // "-0.00" parses fine but should not leak its sign into the store.
    Ok(rounded.abs())
}

/// Parses a `YYYY-MM-DD` date token.
///
/// # Errors
/// [`RowError::InvalidDate`] when the token is not a valid calendar date in that format.
pub fn parse_date(token: &str) -> Result<NaiveDate, RowError> {
    NaiveDate::parse_from_str(token.trim(), DATE_FORMAT).map_err(|_| RowError::InvalidDate {
        value: token.to_string(),
    })
}

/// Formats a price with exactly [`PRICE_SCALE`] fractional digits.
#[must_use]
pub fn format_price(price: Decimal) -> String {
    let mut scaled =
        price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    scaled.rescale(PRICE_SCALE);
    scaled.to_string()
}

/// Formats a date with [`DATE_FORMAT`].
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
