//! Canonical text forms for instants and elapsed durations.
//!
//! Instants render as `DD/MM/YYYY HH:MM:SS` on the local wall clock, with no
//! timezone attached. Durations render as `"<h> hrs <m> mins <s> secs"`.
//! Both forms are part of the exported table format and must stay bit-exact.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use thiserror::Error;

/// `strftime` pattern for the instant text form.
const INSTANT_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

static HOURS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*hrs").unwrap());
static MINUTES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*mins").unwrap());
static SECONDS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*secs").unwrap());

/// Errors raised while converting time text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// Stored timestamp text did not match `DD/MM/YYYY HH:MM:SS`.
    #[error("invalid timestamp {text:?}: {reason}")]
    Format { text: String, reason: &'static str },

    /// The end of an interval lies before its start.
    #[error("time-out {end} is before time-in {start}")]
    InvalidRange { start: String, end: String },
}

/// Renders an instant as `DD/MM/YYYY HH:MM:SS`. Sub-second precision is dropped.
pub fn format_instant(t: NaiveDateTime) -> String {
    t.format(INSTANT_FORMAT).to_string()
}

/// Parses the text produced by [`format_instant`].
pub fn parse_instant(text: &str) -> Result<NaiveDateTime, TimeError> {
    let format_err = |reason| TimeError::Format {
        text: text.to_string(),
        reason,
    };

    let parts: Vec<&str> = text.split(' ').collect();
    let [date, time] = parts.as_slice() else {
        return Err(format_err("expected a date and a time separated by one space"));
    };

    let [day, month, year] = numeric_fields(date, '/').ok_or_else(|| format_err("bad date"))?;
    let [hour, minute, second] =
        numeric_fields(time, ':').ok_or_else(|| format_err("bad time"))?;

    let year = i32::try_from(year).map_err(|_| format_err("year out of range"))?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format_err("no such calendar date"))?
        .and_hms_opt(hour, minute, second)
        .ok_or_else(|| format_err("no such clock time"))
}

/// Splits `part` on `sep` into exactly three unsigned integers.
fn numeric_fields(part: &str, sep: char) -> Option<[u32; 3]> {
    let mut fields = part.split(sep).map(|field| {
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        field.parse::<u32>().ok()
    });
    let parsed = [fields.next()??, fields.next()??, fields.next()??];
    if fields.next().is_some() {
        return None;
    }
    Some(parsed)
}

/// Renders the elapsed time from `start` to `end`, truncated to whole seconds.
pub fn format_duration(start: NaiveDateTime, end: NaiveDateTime) -> Result<String, TimeError> {
    if end < start {
        return Err(TimeError::InvalidRange {
            start: format_instant(start),
            end: format_instant(end),
        });
    }
    let seconds = end.signed_duration_since(start).num_seconds();
    // Non-negative by the check above.
    Ok(format_seconds(seconds.unsigned_abs()))
}

/// Renders a raw second count as `"<h> hrs <m> mins <s> secs"`.
pub fn format_seconds(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours} hrs {minutes} mins {seconds} secs")
}

/// Recovers a second count from duration text.
///
/// Each of `hrs`, `mins` and `secs` contributes the integer immediately
/// before it; a missing unit contributes nothing.
pub fn parse_duration_seconds(text: &str) -> u64 {
    let unit = |re: &Regex| -> u64 {
        re.captures(text)
            .and_then(|caps| caps[1].parse::<u64>().ok())
            .unwrap_or(0)
    };
    unit(&HOURS_RE)
        .saturating_mul(3600)
        .saturating_add(unit(&MINUTES_RE).saturating_mul(60))
        .saturating_add(unit(&SECONDS_RE))
}
