//! Parsers for the loosely formatted amounts and dates sent by the source APIs.

use time::{
    OffsetDateTime, PrimitiveDateTime, Time,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

/// Date-time layouts tried in order after RFC 3339.
const DATE_TIME_FORMATS: [&[BorrowedFormatItem<'static>]; 6] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
];

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse an amount that may carry a currency unit and thousands separators,
/// e.g., "1,500 RWF", "RWF 20" or "2500.5".
///
/// Returns `None` if no finite number remains after the unit and separators
/// are removed.
pub fn parse_amount(text: &str) -> Option<f64> {
    let number: String = text
        .split_whitespace()
        .filter(|token| !token.chars().all(char::is_alphabetic))
        .collect::<String>()
        .replace(',', "");

    number
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

/// Parse a source timestamp.
///
/// Accepts RFC 3339 timestamps, ISO 8601 date-times without an offset (with
/// either 'T' or a space between date and time, seconds and fractions of a
/// second optional) and plain dates, which are read as midnight.
///
/// Timestamps with an offset keep the wall clock time of that offset; the
/// calendar day is the one the source reported.
pub fn parse_date_time(text: &str) -> Option<PrimitiveDateTime> {
    let text = text.trim();

    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(PrimitiveDateTime::new(date_time.date(), date_time.time()));
    }

    if let Some(date_time) = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(text, *format).ok())
    {
        return Some(date_time);
    }

    time::Date::parse(text, DATE_FORMAT)
        .ok()
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT))
}
