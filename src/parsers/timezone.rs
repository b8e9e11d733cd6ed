//! Time zone identifier parsing.

use alloc::borrow::ToOwned;

use crate::{
    timezone::{TimeZone, UtcOffset},
    TemporaError, TemporaResult,
};

use super::{
    parse_annotated_date_time, parse_time, parse_utc_offset, try_parse_month_day,
    try_parse_year_month, Cursor, TimeZoneRecord, UtcOffsetRecord, UtcOffsetRecordOrZ,
};

/// Parses a standalone time zone identifier: either a minute-precision
/// UTC offset or an IANA name.
pub(crate) fn parse_identifier(source: &str) -> TemporaResult<TimeZone> {
    let mut cursor = Cursor::new(source.as_bytes());
    if cursor.check(|b| b == b'+' || b == b'-') || cursor.peek() == Some(0xE2) {
        let record = parse_utc_offset(&mut cursor, false)?;
        cursor.expect_end()?;
        return Ok(TimeZone::UtcOffset(offset_from_record(record)));
    }
    if is_valid_iana_name(source.as_bytes()) {
        return Ok(TimeZone::Named(source.to_owned()));
    }
    Err(TemporaError::range().with_message("invalid time zone identifier"))
}

/// Extracts a time zone from any interchange string that can carry
/// one, mirroring the formats accepted for a zone-bearing input.
pub(crate) fn parse_allowed_timezone_formats(source: &str) -> Option<TimeZone> {
    let parsed = parse_annotated_date_time(source)
        .ok()
        .or_else(|| parse_time(source).ok())
        .or_else(|| try_parse_year_month(source).ok())
        .or_else(|| try_parse_month_day(source).ok())?;

    if let Some(annotation) = parsed.timezone {
        return Some(match annotation.tz {
            TimeZoneRecord::Named(name) => TimeZone::Named(name),
            TimeZoneRecord::Offset(record) => TimeZone::UtcOffset(offset_from_record(record)),
        });
    }
    match parsed.offset? {
        UtcOffsetRecordOrZ::Z => Some(TimeZone::UtcOffset(UtcOffset::from_minutes(0))),
        UtcOffsetRecordOrZ::Offset(record) => {
            Some(TimeZone::UtcOffset(offset_from_record(record)))
        }
    }
}

/// Truncates an offset record to minute precision.
fn offset_from_record(record: UtcOffsetRecord) -> UtcOffset {
    let minutes = (i16::from(record.hour) * 60 + i16::from(record.minute))
        * i16::from(record.sign.as_sign_multiplier());
    UtcOffset::from_minutes(minutes)
}

fn is_valid_iana_name(source: &[u8]) -> bool {
    let mut component_len = 0usize;
    for &byte in source {
        match byte {
            b'/' => {
                if component_len == 0 {
                    return false;
                }
                component_len = 0;
            }
            b if b.is_ascii_alphabetic() || matches!(b, b'.' | b'_') => component_len += 1,
            // Digits and signs cannot open a component.
            b if b.is_ascii_digit() || matches!(b, b'+' | b'-') => {
                if component_len == 0 {
                    return false;
                }
                component_len += 1;
            }
            _ => return false,
        }
    }
    component_len != 0
}
