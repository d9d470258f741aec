//! Calendar date helpers for the `YYYY-MM-DD` wire format.

use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// # Errors
/// Returns the parse error when the input is not a valid calendar date.
pub fn parse_iso_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value, ISO_DATE)
}

/// Format a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
