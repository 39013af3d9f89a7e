//! Parsing of the timestamps found in position reports.
//!
//! Feeds mix several textual formats in the same column so we try the common ISO-like ones
//! first with `chrono` and fall back on `dateparser` for everything else (epoch seconds,
//! US-style dates, named months, …).  Values without an offset are taken as UTC.
//!

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;
use tracing::trace;

/// Naive formats tried before handing over to `dateparser`.
const NAIVE_FMTS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Error, PartialEq)]
pub enum ErrDate {
    #[error("bad timestamp: {0}")]
    BadTimestamp(String),
    #[error("bad date: {0}")]
    BadDate(String),
}

/// Parse a single timestamp in any of the supported formats.
///
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, ErrDate> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ErrDate::BadTimestamp(input.to_string()));
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts.with_timezone(&Utc));
    }

    if let Some(ts) = NAIVE_FMTS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
    {
        return Ok(Utc.from_utc_datetime(&ts));
    }

    // Date-only values are at midnight, never at the current time.
    //
    trace!("falling back to dateparser for {input}");
    dateparser::parse_with(input, &Utc, NaiveTime::MIN)
        .map_err(|_| ErrDate::BadTimestamp(input.to_string()))
}

/// Parse a calendar day, as given on the command-line.
///
/// Accepts `YYYY-MM-DD` and anything `parse_timestamp()` understands, the time part being
/// dropped.
///
#[tracing::instrument]
pub fn parse_day(input: &str) -> Result<NaiveDate, ErrDate> {
    let input = input.trim();
    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(day);
    }
    match parse_timestamp(input) {
        Ok(ts) => Ok(ts.date_naive()),
        Err(_) => Err(ErrDate::BadDate(input.to_string())),
    }
}
