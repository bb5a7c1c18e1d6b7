//! Long date-time and UTC offset text formats
//!
//! Transaction times travel as `YYYY-MM-DD HH:MM:SS` in a fixed UTC offset and
//! offsets as `+HH:MM` / `-HH:MM`. Stored instants are UTC with whole-second
//! precision, the smallest transaction time unit.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::error::{ConvertError, Result};

const LONG_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Largest accepted offset magnitude in minutes (+/-14:00)
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Parse a long date-time interpreted in the given UTC offset (minutes).
pub fn parse_long_date_time(text: &str, utc_offset_minutes: i32) -> Result<DateTime<Utc>> {
    let local = NaiveDateTime::parse_from_str(text, LONG_DATE_TIME_FORMAT)
        .map_err(|_| ConvertError::TransactionTimeInvalid)?;
    let offset = fixed_offset(utc_offset_minutes).ok_or(ConvertError::TransactionTimeInvalid)?;

    offset
        .from_local_datetime(&local)
        .single()
        .map(|time| truncate_to_seconds(time.with_timezone(&Utc)))
        .ok_or(ConvertError::TransactionTimeInvalid)
}

/// Render a UTC instant as a long date-time in the given offset.
pub fn format_long_date_time(time: DateTime<Utc>, utc_offset_minutes: i32) -> String {
    match fixed_offset(utc_offset_minutes) {
        Some(offset) => time
            .with_timezone(&offset)
            .format(LONG_DATE_TIME_FORMAT)
            .to_string(),
        None => time.format(LONG_DATE_TIME_FORMAT).to_string(),
    }
}

/// Parse `+HH:MM` / `-HH:MM` into minutes east of UTC.
pub fn parse_timezone_offset(text: &str) -> Option<i32> {
    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };

    let (hours, minutes) = rest.split_once(':')?;

    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());

    if !two_digits(hours) || !two_digits(minutes) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;

    if minutes >= 60 {
        return None;
    }

    let total = hours * 60 + minutes;

    if total > MAX_OFFSET_MINUTES {
        return None;
    }

    Some(sign * total)
}

/// Render minutes east of UTC as `+HH:MM` / `-HH:MM`.
pub fn format_timezone_offset(utc_offset_minutes: i32) -> String {
    let sign = if utc_offset_minutes < 0 { '-' } else { '+' };
    let magnitude = utc_offset_minutes.unsigned_abs();

    format!("{}{:02}:{:02}", sign, magnitude / 60, magnitude % 60)
}

fn fixed_offset(utc_offset_minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(utc_offset_minutes.checked_mul(60)?)
}

fn truncate_to_seconds(time: DateTime<Utc>) -> DateTime<Utc> {
    time.with_nanosecond(0).unwrap_or(time)
}
