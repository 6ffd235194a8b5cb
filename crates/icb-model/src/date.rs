//! `YYYYMMDD` calendar dates used by validity intervals and administration dates.

use chrono::NaiveDate;

use crate::error::{ModelError, Result};

const CODE_DATE_FORMAT: &str = "%Y%m%d";

/// Parse a `YYYYMMDD` date, returning `None` for blank or malformed input.
///
/// Malformed dates are treated as "no usable date" by every caller, so this
/// is the lenient entry point.
pub fn parse_code_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(text, CODE_DATE_FORMAT).ok()
}

/// Strict variant of [`parse_code_date`].
pub fn try_parse_code_date(raw: &str) -> Result<NaiveDate> {
    parse_code_date(raw).ok_or_else(|| ModelError::InvalidDate {
        value: raw.to_string(),
    })
}

/// Format a date back into `YYYYMMDD`.
pub fn format_code_date(date: NaiveDate) -> String {
    date.format(CODE_DATE_FORMAT).to_string()
}
