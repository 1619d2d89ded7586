#![forbid(unsafe_code)]

use time::format_description::well_known::Rfc3339;
use time::macros::time;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Parses a pipeline timestamp. Accepts RFC 3339 and the offset-less ISO form (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }
    let normalized = raw.replacen(' ', "T", 1);
    OffsetDateTime::parse(&format!("{normalized}Z"), &Rfc3339).ok()
}

pub fn parse_optional(raw: Option<&str>) -> Option<OffsetDateTime> {
    raw.and_then(parse_timestamp)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateParseError {
    Format,
    OutOfRange,
}

impl DateParseError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Format => "date must be YYYY-MM-DD",
            Self::OutOfRange => "date is out of range",
        }
    }
}

/// Parses `YYYY-MM-DD` as a calendar date, without any timezone shift.
pub fn parse_calendar_date(raw: &str) -> Result<Date, DateParseError> {
    let mut parts = raw.trim().split('-');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(DateParseError::Format);
    };
    let year = y.parse::<i32>().map_err(|_| DateParseError::Format)?;
    let month = m.parse::<u8>().map_err(|_| DateParseError::Format)?;
    let day = d.parse::<u8>().map_err(|_| DateParseError::Format)?;
    let month = Month::try_from(month).map_err(|_| DateParseError::OutOfRange)?;
    Date::from_calendar_date(year, month, day).map_err(|_| DateParseError::OutOfRange)
}

pub fn format_calendar_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Local 00:00:00.000 of `date`.
pub fn start_of_local_day(date: Date, offset: UtcOffset) -> OffsetDateTime {
    PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_offset(offset)
}

/// Local 23:59:59.999 of `date`.
pub fn end_of_local_day(date: Date, offset: UtcOffset) -> OffsetDateTime {
    PrimitiveDateTime::new(date, time!(23:59:59.999)).assume_offset(offset)
}

pub fn local_today(now: OffsetDateTime, offset: UtcOffset) -> Date {
    now.to_offset(offset).date()
}

/// Whole-day lookback from today, in local dates.
pub fn days_before(date: Date, days: i64) -> Date {
    date.checked_sub(Duration::days(days)).unwrap_or(date)
}

/// Fractional hours from `then` to `now`; negative when `then` is in the future.
pub fn hours_since(then: OffsetDateTime, now: OffsetDateTime) -> f64 {
    (now - then).as_seconds_f64() / 3600.0
}
