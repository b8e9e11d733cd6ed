//! Parsing for the RFC 9557 interchange formats.
//!
//! The grammar is recognized with a byte cursor over the source. Each
//! entry point parses one interchange production and returns a raw
//! record; the consuming type interprets the record against its own
//! semantics.

use crate::{
    duration::Duration,
    iso::iso_days_in_month,
    Sign, TemporaError, TemporaResult,
};
use alloc::string::String;

mod timezone;
mod writer;

pub(crate) use timezone::{parse_allowed_timezone_formats, parse_identifier};
pub use writer::{
    FormattableCalendar, FormattableDate, FormattableDateTime, FormattableDuration,
    FormattableMonthDay, FormattableOffset, FormattableOffsetKind, FormattableTime,
    FormattableTimeZone, FormattableUtcOffset, FormattableYearMonth, IsoStringBuilder,
};

const NS_PER_SECOND: i64 = 1_000_000_000;

// ==== Records ====

/// A lexical calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRecord {
    /// The signed year.
    pub year: i32,
    /// The one-based month.
    pub month: u8,
    /// The one-based day.
    pub day: u8,
}

/// A lexical wall-clock time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimeRecord {
    /// The hour.
    pub hour: u8,
    /// The minute.
    pub minute: u8,
    /// The second, with a leap second already clamped.
    pub second: u8,
    /// The combined sub-second component.
    pub nanosecond: u32,
}

/// A lexical UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcOffsetRecord {
    /// The sign of the offset.
    pub sign: Sign,
    /// The hour magnitude.
    pub hour: u8,
    /// The minute magnitude.
    pub minute: u8,
    /// The second magnitude.
    pub second: u8,
    /// The sub-second magnitude.
    pub nanosecond: u32,
    /// Whether the offset spelled out seconds.
    pub has_seconds: bool,
}

impl UtcOffsetRecord {
    /// The offset as signed nanoseconds east of UTC.
    pub fn to_nanoseconds(self) -> i64 {
        let magnitude = (i64::from(self.hour) * 3_600 + i64::from(self.minute) * 60
            + i64::from(self.second))
            * NS_PER_SECOND
            + i64::from(self.nanosecond);
        magnitude * i64::from(self.sign.as_sign_multiplier())
    }
}

/// A UTC offset or the `Z` designator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtcOffsetRecordOrZ {
    /// The `Z` designator.
    Z,
    /// A numeric offset.
    Offset(UtcOffsetRecord),
}

/// A time zone carried in a bracketed annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeZoneRecord {
    /// A named identifier such as `America/New_York`.
    Named(String),
    /// A numeric offset identifier.
    Offset(UtcOffsetRecord),
}

/// A bracketed time zone annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeZoneAnnotation {
    /// Whether the annotation carried the critical flag.
    pub critical: bool,
    /// The annotated zone.
    pub tz: TimeZoneRecord,
}

/// The parsed components of an interchange string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedDateTime {
    /// The date component.
    pub date: Option<DateRecord>,
    /// The time component.
    pub time: Option<TimeRecord>,
    /// The UTC offset component.
    pub offset: Option<UtcOffsetRecordOrZ>,
    /// The time zone annotation.
    pub timezone: Option<TimeZoneAnnotation>,
    /// The calendar annotation value.
    pub calendar: Option<String>,
    calendar_critical: bool,
}

impl ParsedDateTime {
    /// Whether the string carried the `Z` designator.
    pub fn has_utc_designator(&self) -> bool {
        matches!(self.offset, Some(UtcOffsetRecordOrZ::Z))
    }
}

// ==== Cursor ====

#[derive(Debug)]
struct Cursor<'a> {
    source: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a [u8]) -> Self {
        Self { source, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.source.get(self.pos + n).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn advance_by(&mut self, n: usize) {
        self.pos += n;
    }

    fn check(&self, f: impl FnOnce(u8) -> bool) -> bool {
        self.peek().is_some_and(f)
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.advance();
            return true;
        }
        false
    }

    fn finished(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn expect_end(&self) -> TemporaResult<()> {
        if !self.finished() {
            return Err(TemporaError::syntax()
                .with_message("unexpected characters after the parsed value"));
        }
        Ok(())
    }
}

fn abrupt_end() -> TemporaError {
    TemporaError::syntax().with_message("unexpected end of input")
}

fn parse_digit(cursor: &mut Cursor<'_>) -> TemporaResult<u8> {
    let byte = cursor.peek().ok_or_else(abrupt_end)?;
    if !byte.is_ascii_digit() {
        return Err(TemporaError::syntax().with_message("expected an ascii digit"));
    }
    cursor.advance();
    Ok(byte - b'0')
}

fn parse_two_digits(cursor: &mut Cursor<'_>) -> TemporaResult<u8> {
    let tens = parse_digit(cursor)?;
    let ones = parse_digit(cursor)?;
    Ok(tens * 10 + ones)
}

/// Consumes an ascii sign or the U+2212 minus, if present.
fn eat_sign(cursor: &mut Cursor<'_>) -> Option<Sign> {
    match cursor.peek() {
        Some(b'+') => {
            cursor.advance();
            Some(Sign::Positive)
        }
        Some(b'-') => {
            cursor.advance();
            Some(Sign::Negative)
        }
        Some(0xE2) if cursor.peek_at(1) == Some(0x88) && cursor.peek_at(2) == Some(0x92) => {
            cursor.advance_by(3);
            Some(Sign::Negative)
        }
        _ => None,
    }
}

// ==== Grammar productions ====

fn parse_year(cursor: &mut Cursor<'_>) -> TemporaResult<i32> {
    if let Some(sign) = eat_sign(cursor) {
        let mut year: i32 = 0;
        for _ in 0..6 {
            year = year * 10 + i32::from(parse_digit(cursor)?);
        }
        if year == 0 && sign == Sign::Negative {
            return Err(TemporaError::range()
                .with_message("the year zero must not carry a negative sign"));
        }
        return Ok(year * i32::from(sign.as_sign_multiplier()));
    }
    let mut year: i32 = 0;
    for _ in 0..4 {
        year = year * 10 + i32::from(parse_digit(cursor)?);
    }
    Ok(year)
}

fn parse_date_record(cursor: &mut Cursor<'_>) -> TemporaResult<DateRecord> {
    let year = parse_year(cursor)?;
    let extended = cursor.eat(b'-');
    let month = parse_two_digits(cursor)?;
    if extended && !cursor.eat(b'-') {
        return Err(TemporaError::syntax().with_message("inconsistent date separators"));
    }
    let day = parse_two_digits(cursor)?;
    validate_month(month)?;
    validate_day(year, month, day)?;
    Ok(DateRecord { year, month, day })
}

fn validate_month(month: u8) -> TemporaResult<()> {
    if !(1..=12).contains(&month) {
        return Err(TemporaError::range().with_message("month must be between 1 and 12"));
    }
    Ok(())
}

fn validate_day(year: i32, month: u8, day: u8) -> TemporaResult<()> {
    if day < 1 || day > iso_days_in_month(year, month) {
        return Err(TemporaError::range().with_message("day is out of range for the month"));
    }
    Ok(())
}

fn parse_fraction(cursor: &mut Cursor<'_>) -> TemporaResult<u32> {
    let mut value: u32 = 0;
    let mut digits = 0usize;
    while cursor.check(|b| b.is_ascii_digit()) {
        if digits == 9 {
            return Err(TemporaError::syntax()
                .with_message("fractional seconds support at most nine digits"));
        }
        value = value * 10 + u32::from(parse_digit(cursor)?);
        digits += 1;
    }
    if digits == 0 {
        return Err(TemporaError::syntax().with_message("a fraction requires at least one digit"));
    }
    // Scale to nanoseconds.
    Ok(value * 10u32.pow(9 - digits as u32))
}

fn parse_time_record(cursor: &mut Cursor<'_>) -> TemporaResult<TimeRecord> {
    let hour = parse_two_digits(cursor)?;
    if hour > 23 {
        return Err(TemporaError::range().with_message("hour must be between 0 and 23"));
    }
    let mut record = TimeRecord {
        hour,
        ..Default::default()
    };
    let extended = cursor.eat(b':');
    if !extended && !cursor.check(|b| b.is_ascii_digit()) {
        return Ok(record);
    }
    record.minute = parse_two_digits(cursor)?;
    if record.minute > 59 {
        return Err(TemporaError::range().with_message("minute must be between 0 and 59"));
    }
    let has_second = if extended {
        cursor.eat(b':')
    } else {
        cursor.check(|b| b.is_ascii_digit())
    };
    if !has_second {
        return Ok(record);
    }
    let second = parse_two_digits(cursor)?;
    if second > 60 {
        return Err(TemporaError::range().with_message("second must be between 0 and 60"));
    }
    let fraction = if cursor.eat(b'.') || cursor.eat(b',') {
        parse_fraction(cursor)?
    } else {
        0
    };
    if second == 60 {
        // A leap second reads as the last representable instant of the
        // minute; its fraction is discarded.
        record.second = 59;
        record.nanosecond = 999_999_999;
    } else {
        record.second = second;
        record.nanosecond = fraction;
    }
    Ok(record)
}

fn parse_utc_offset(cursor: &mut Cursor<'_>, allow_sub_minute: bool) -> TemporaResult<UtcOffsetRecord> {
    let sign = eat_sign(cursor).ok_or_else(|| {
        TemporaError::syntax().with_message("a utc offset requires a leading sign")
    })?;
    let hour = parse_two_digits(cursor)?;
    if hour > 23 {
        return Err(TemporaError::range().with_message("offset hour must be between 0 and 23"));
    }
    let mut record = UtcOffsetRecord {
        sign,
        hour,
        minute: 0,
        second: 0,
        nanosecond: 0,
        has_seconds: false,
    };
    let extended = cursor.eat(b':');
    if !extended && !cursor.check(|b| b.is_ascii_digit()) {
        return Ok(record);
    }
    record.minute = parse_two_digits(cursor)?;
    if record.minute > 59 {
        return Err(TemporaError::range().with_message("offset minute must be between 0 and 59"));
    }
    let has_second = if extended {
        cursor.eat(b':')
    } else {
        cursor.check(|b| b.is_ascii_digit())
    };
    if !has_second {
        return Ok(record);
    }
    if !allow_sub_minute {
        return Err(TemporaError::syntax()
            .with_message("sub-minute offsets are not allowed in this position"));
    }
    record.second = parse_two_digits(cursor)?;
    if record.second > 59 {
        return Err(TemporaError::range().with_message("offset second must be between 0 and 59"));
    }
    record.has_seconds = true;
    if cursor.eat(b'.') || cursor.eat(b',') {
        record.nanosecond = parse_fraction(cursor)?;
    }
    Ok(record)
}

// ==== Annotations ====

fn is_annotation_key_char(byte: u8) -> bool {
    byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-' || byte == b'_'
}

fn is_annotation_value_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-'
}

fn is_tz_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'+' | b'-' | b'/')
}

/// Parses the bracketed suffix: at most one leading time zone
/// annotation, then any number of key-value annotations.
fn parse_annotations(cursor: &mut Cursor<'_>, parsed: &mut ParsedDateTime) -> TemporaResult<()> {
    let mut first = true;
    while cursor.eat(b'[') {
        let critical = cursor.eat(b'!');
        // A key-value annotation has an '=' before the closing
        // bracket; a time zone annotation does not.
        let mut lookahead = 0;
        let mut is_key_value = false;
        loop {
            match cursor.peek_at(lookahead) {
                Some(b']') => break,
                Some(b'=') => {
                    is_key_value = true;
                    break;
                }
                Some(_) => lookahead += 1,
                None => return Err(abrupt_end()),
            }
        }
        if is_key_value {
            parse_key_value_annotation(cursor, critical, parsed)?;
        } else {
            if !first {
                return Err(TemporaError::syntax()
                    .with_message("a time zone annotation must come first"));
            }
            parsed.timezone = Some(parse_timezone_annotation(cursor, critical)?);
        }
        if !cursor.eat(b']') {
            return Err(TemporaError::syntax().with_message("unterminated annotation"));
        }
        first = false;
    }
    Ok(())
}

fn parse_timezone_annotation(
    cursor: &mut Cursor<'_>,
    critical: bool,
) -> TemporaResult<TimeZoneAnnotation> {
    if cursor.check(|b| b == b'+' || b == b'-') || cursor.peek() == Some(0xE2) {
        let offset = parse_utc_offset(cursor, false)?;
        return Ok(TimeZoneAnnotation {
            critical,
            tz: TimeZoneRecord::Offset(offset),
        });
    }
    let start = cursor.pos;
    let mut component_len = 0usize;
    while let Some(byte) = cursor.peek() {
        match byte {
            b']' => break,
            b'/' => {
                if component_len == 0 {
                    return Err(TemporaError::range()
                        .with_message("invalid time zone identifier"));
                }
                component_len = 0;
                cursor.advance();
            }
            b if is_tz_name_char(b) => {
                component_len += 1;
                cursor.advance();
            }
            _ => return Err(TemporaError::range().with_message("invalid time zone identifier")),
        }
    }
    if component_len == 0 {
        return Err(TemporaError::range().with_message("invalid time zone identifier"));
    }
    let name = core::str::from_utf8(&cursor.source[start..cursor.pos])
        .map_err(|_| TemporaError::range().with_message("invalid time zone identifier"))?;
    Ok(TimeZoneAnnotation {
        critical,
        tz: TimeZoneRecord::Named(String::from(name)),
    })
}

fn parse_key_value_annotation(
    cursor: &mut Cursor<'_>,
    critical: bool,
    parsed: &mut ParsedDateTime,
) -> TemporaResult<()> {
    let key_start = cursor.pos;
    while cursor.check(is_annotation_key_char) {
        cursor.advance();
    }
    let key = &cursor.source[key_start..cursor.pos];
    if key.is_empty() || !cursor.eat(b'=') {
        return Err(TemporaError::syntax().with_message("malformed annotation key"));
    }
    let value_start = cursor.pos;
    loop {
        while cursor.check(is_annotation_value_char) {
            cursor.advance();
        }
        if cursor.pos == value_start || cursor.pos == cursor.source.len() {
            return Err(TemporaError::syntax().with_message("malformed annotation value"));
        }
        if !cursor.eat(b'.') {
            break;
        }
    }
    let value = &cursor.source[value_start..cursor.pos];
    if value.is_empty() || value.last() == Some(&b'.') {
        return Err(TemporaError::syntax().with_message("malformed annotation value"));
    }
    if key == b"u-ca" {
        match parsed.calendar {
            None => {
                let value = core::str::from_utf8(value)
                    .map_err(|_| TemporaError::syntax().with_message("malformed annotation value"))?;
                parsed.calendar = Some(String::from(value));
                parsed.calendar_critical = critical;
            }
            Some(_) if critical || parsed.calendar_critical => {
                return Err(TemporaError::range()
                    .with_message("duplicate calendar annotation with the critical flag"));
            }
            // Duplicate non-critical calendars are ignored.
            Some(_) => {}
        }
        return Ok(());
    }
    if critical {
        return Err(TemporaError::range()
            .with_message("unrecognized annotation with the critical flag"));
    }
    Ok(())
}

// ==== Entry points ====

fn parse_annotated_date_time(source: &str) -> TemporaResult<ParsedDateTime> {
    let mut cursor = Cursor::new(source.as_bytes());
    let mut parsed = ParsedDateTime {
        date: Some(parse_date_record(&mut cursor)?),
        ..Default::default()
    };
    if matches!(cursor.peek(), Some(b'T' | b't' | b' ')) {
        cursor.advance();
        parsed.time = Some(parse_time_record(&mut cursor)?);
        match cursor.peek() {
            Some(b'Z' | b'z') => {
                cursor.advance();
                parsed.offset = Some(UtcOffsetRecordOrZ::Z);
            }
            Some(b'+' | b'-' | 0xE2) => {
                let offset = parse_utc_offset(&mut cursor, true)?;
                parsed.offset = Some(UtcOffsetRecordOrZ::Offset(offset));
            }
            _ => {}
        }
    }
    parse_annotations(&mut cursor, &mut parsed)?;
    cursor.expect_end()?;
    Ok(parsed)
}

/// Parses a civil date-time string. The `Z` designator is rejected;
/// an instant is not a wall reading.
pub fn parse_date_time(source: &str) -> TemporaResult<ParsedDateTime> {
    let parsed = parse_annotated_date_time(source)?;
    if parsed.has_utc_designator() {
        return Err(TemporaError::range()
            .with_message("the Z designator is not valid for a civil type"));
    }
    Ok(parsed)
}

/// Parses an exact-time string: a date-time with a required UTC offset
/// or `Z` designator.
pub fn parse_instant(source: &str) -> TemporaResult<ParsedDateTime> {
    let parsed = parse_annotated_date_time(source)?;
    if parsed.time.is_none() {
        return Err(TemporaError::range()
            .with_message("an exact-time string requires a time component"));
    }
    if parsed.offset.is_none() {
        return Err(TemporaError::range()
            .with_message("an exact-time string requires a utc offset"));
    }
    Ok(parsed)
}

/// Parses a zoned date-time string: a date-time with a required time
/// zone annotation.
pub fn parse_zoned_date_time(source: &str) -> TemporaResult<ParsedDateTime> {
    let parsed = parse_annotated_date_time(source)?;
    if parsed.timezone.is_none() {
        return Err(TemporaError::range()
            .with_message("a zoned date-time string requires a time zone annotation"));
    }
    Ok(parsed)
}

fn try_parse_year_month(source: &str) -> TemporaResult<ParsedDateTime> {
    let mut cursor = Cursor::new(source.as_bytes());
    let year = parse_year(&mut cursor)?;
    cursor.eat(b'-');
    let month = parse_two_digits(&mut cursor)?;
    validate_month(month)?;
    let mut parsed = ParsedDateTime {
        date: Some(DateRecord {
            year,
            month,
            day: 1,
        }),
        ..Default::default()
    };
    parse_annotations(&mut cursor, &mut parsed)?;
    cursor.expect_end()?;
    // The day-less form is exclusive to the iso8601 calendar.
    if parsed
        .calendar
        .as_deref()
        .is_some_and(|calendar| calendar != "iso8601")
    {
        return Err(TemporaError::range()
            .with_message("a year-month string with a calendar must spell out the day"));
    }
    Ok(parsed)
}

/// Parses a year-month string, accepting the day-less form and the
/// full date form.
pub fn parse_year_month(source: &str) -> TemporaResult<ParsedDateTime> {
    match try_parse_year_month(source) {
        Ok(parsed) => Ok(parsed),
        Err(_) => parse_date_time(source),
    }
}

fn try_parse_month_day(source: &str) -> TemporaResult<ParsedDateTime> {
    let mut cursor = Cursor::new(source.as_bytes());
    if cursor.eat(b'-') && !cursor.eat(b'-') {
        return Err(TemporaError::syntax().with_message("malformed month-day string"));
    }
    let month = parse_two_digits(&mut cursor)?;
    cursor.eat(b'-');
    let day = parse_two_digits(&mut cursor)?;
    validate_month(month)?;
    // The reference year is a leap year, so every month-day reads.
    validate_day(1972, month, day)?;
    let mut parsed = ParsedDateTime {
        date: Some(DateRecord {
            year: 1972,
            month,
            day,
        }),
        ..Default::default()
    };
    parse_annotations(&mut cursor, &mut parsed)?;
    cursor.expect_end()?;
    if parsed
        .calendar
        .as_deref()
        .is_some_and(|calendar| calendar != "iso8601")
    {
        return Err(TemporaError::range()
            .with_message("a month-day string with a calendar must spell out the year"));
    }
    Ok(parsed)
}

/// Parses a month-day string, accepting the year-less form and the
/// full date form.
pub fn parse_month_day(source: &str) -> TemporaResult<ParsedDateTime> {
    match try_parse_month_day(source) {
        Ok(parsed) => Ok(parsed),
        Err(_) => parse_date_time(source),
    }
}

/// Parses a time string, optionally prefixed with the `T` designator.
///
/// Without the designator, strings that also read as a date, a
/// year-month, or a month-day are rejected as ambiguous.
pub fn parse_time(source: &str) -> TemporaResult<ParsedDateTime> {
    let mut cursor = Cursor::new(source.as_bytes());
    let designated = matches!(cursor.peek(), Some(b'T' | b't'));
    if designated {
        cursor.advance();
    }
    let time = parse_time_record(&mut cursor)?;
    let mut parsed = ParsedDateTime {
        time: Some(time),
        ..Default::default()
    };
    match cursor.peek() {
        Some(b'Z' | b'z') => {
            return Err(TemporaError::range()
                .with_message("the Z designator is not valid for a civil type"));
        }
        Some(b'+' | b'-' | 0xE2) => {
            let offset = parse_utc_offset(&mut cursor, true)?;
            parsed.offset = Some(UtcOffsetRecordOrZ::Offset(offset));
        }
        _ => {}
    }
    parse_annotations(&mut cursor, &mut parsed)?;
    cursor.expect_end()?;
    if !designated
        && (try_parse_year_month(source).is_ok() || try_parse_month_day(source).is_ok())
    {
        return Err(TemporaError::range()
            .with_message("time string is ambiguous with a date form"));
    }
    Ok(parsed)
}

// ==== Durations ====

struct DurationComponent {
    value: u64,
    fraction: Option<u32>,
}

fn parse_duration_component(
    cursor: &mut Cursor<'_>,
    allow_fraction: bool,
) -> TemporaResult<DurationComponent> {
    let mut value: u64 = 0;
    let mut digits = 0usize;
    while cursor.check(|b| b.is_ascii_digit()) {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(parse_digit(cursor).ok()?)))
            .ok_or_else(|| {
                TemporaError::range().with_message("duration component is out of range")
            })?;
        digits += 1;
    }
    if digits == 0 {
        return Err(TemporaError::syntax().with_message("expected a duration component value"));
    }
    let fraction = if cursor.check(|b| b == b'.' || b == b',') {
        if !allow_fraction {
            return Err(TemporaError::syntax()
                .with_message("only the final duration component may carry a fraction"));
        }
        cursor.advance();
        Some(parse_fraction(cursor)?)
    } else {
        None
    };
    Ok(DurationComponent { value, fraction })
}

fn component_to_i64(value: u64, sign: Sign) -> TemporaResult<i64> {
    let value = i64::try_from(value)
        .map_err(|_| TemporaError::range().with_message("duration component is out of range"))?;
    Ok(value * i64::from(sign.as_sign_multiplier()))
}

/// Parses an ISO 8601 duration string.
///
/// A fraction is accepted on the last time component only and
/// cascades into the smaller fields.
pub fn parse_duration(source: &str) -> TemporaResult<Duration> {
    let mut cursor = Cursor::new(source.as_bytes());
    let sign = eat_sign(&mut cursor).unwrap_or(Sign::Positive);
    if !(cursor.eat(b'P') || cursor.eat(b'p')) {
        return Err(TemporaError::syntax().with_message("a duration requires the P designator"));
    }

    let mut years = 0u64;
    let mut months = 0u64;
    let mut weeks = 0u64;
    let mut days = 0u64;
    let mut saw_date = false;

    let date_units: [(u8, &mut u64); 4] = [
        (b'Y', &mut years),
        (b'M', &mut months),
        (b'W', &mut weeks),
        (b'D', &mut days),
    ];
    let mut pending: Option<u64> = None;
    for (designator, slot) in date_units {
        if pending.is_none() {
            if !cursor.check(|b| b.is_ascii_digit()) {
                break;
            }
            pending = Some(parse_duration_component(&mut cursor, false)?.value);
        }
        if cursor.eat(designator) || cursor.eat(designator.to_ascii_lowercase()) {
            *slot = pending.take().unwrap_or(0);
            saw_date = true;
        }
    }
    if pending.is_some() {
        return Err(TemporaError::syntax().with_message("unexpected duration designator"));
    }

    let mut hours = 0i64;
    let mut minutes = 0i64;
    let mut seconds = 0i64;
    let mut milliseconds = 0i64;
    let mut microseconds = 0i64;
    let mut nanoseconds = 0i64;

    let has_time = cursor.eat(b'T') || cursor.eat(b't');
    if has_time {
        if !cursor.check(|b| b.is_ascii_digit()) {
            return Err(TemporaError::syntax()
                .with_message("the T designator requires a time component"));
        }
        let component = parse_duration_component(&mut cursor, true)?;
        if cursor.eat(b'H') || cursor.eat(b'h') {
            hours = component_to_i64(component.value, sign)?;
            if let Some(fraction) = component.fraction {
                // A fractional hour is redistributed downward.
                let ns = u64::from(fraction) * 3_600;
                minutes = component_to_i64(ns / 60_000_000_000, sign)?;
                let rem = ns % 60_000_000_000;
                seconds = component_to_i64(rem / 1_000_000_000, sign)?;
                let rem = rem % 1_000_000_000;
                milliseconds = component_to_i64(rem / 1_000_000, sign)?;
                microseconds = component_to_i64(rem % 1_000_000 / 1_000, sign)?;
                nanoseconds = component_to_i64(rem % 1_000, sign)?;
            } else if cursor.check(|b| b.is_ascii_digit()) {
                let component = parse_duration_component(&mut cursor, true)?;
                parse_duration_minutes_seconds(
                    &mut cursor,
                    component,
                    sign,
                    &mut minutes,
                    &mut seconds,
                    &mut milliseconds,
                    &mut microseconds,
                    &mut nanoseconds,
                )?;
            }
        } else {
            parse_duration_minutes_seconds(
                &mut cursor,
                component,
                sign,
                &mut minutes,
                &mut seconds,
                &mut milliseconds,
                &mut microseconds,
                &mut nanoseconds,
            )?;
        }
    } else if !saw_date {
        return Err(TemporaError::syntax().with_message("a duration requires a component"));
    }

    cursor.expect_end()?;
    Duration::new(
        component_to_i64(years, sign)?,
        component_to_i64(months, sign)?,
        component_to_i64(weeks, sign)?,
        component_to_i64(days, sign)?,
        hours,
        minutes,
        seconds,
        milliseconds,
        microseconds,
        nanoseconds,
    )
}

/// Handles the minute and second components, starting from a component
/// whose designator has not yet been consumed.
#[allow(clippy::too_many_arguments)]
fn parse_duration_minutes_seconds(
    cursor: &mut Cursor<'_>,
    component: DurationComponent,
    sign: Sign,
    minutes: &mut i64,
    seconds: &mut i64,
    milliseconds: &mut i64,
    microseconds: &mut i64,
    nanoseconds: &mut i64,
) -> TemporaResult<()> {
    let mut component = component;
    if cursor.eat(b'M') || cursor.eat(b'm') {
        *minutes = component_to_i64(component.value, sign)?;
        if let Some(fraction) = component.fraction {
            // A fractional minute is redistributed downward.
            let ns = u64::from(fraction) * 60;
            *seconds = component_to_i64(ns / 1_000_000_000, sign)?;
            let rem = ns % 1_000_000_000;
            *milliseconds = component_to_i64(rem / 1_000_000, sign)?;
            *microseconds = component_to_i64(rem % 1_000_000 / 1_000, sign)?;
            *nanoseconds = component_to_i64(rem % 1_000, sign)?;
            return Ok(());
        }
        if !cursor.check(|b| b.is_ascii_digit()) {
            return Ok(());
        }
        component = parse_duration_component(cursor, true)?;
    }
    if cursor.eat(b'S') || cursor.eat(b's') {
        *seconds = component_to_i64(component.value, sign)?;
        if let Some(fraction) = component.fraction {
            *milliseconds = component_to_i64(u64::from(fraction) / 1_000_000, sign)?;
            *microseconds = component_to_i64(u64::from(fraction) % 1_000_000 / 1_000, sign)?;
            *nanoseconds = component_to_i64(u64::from(fraction) % 1_000, sign)?;
        }
        return Ok(());
    }
    Err(TemporaError::syntax().with_message("unexpected duration designator"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_and_extended_dates_agree() {
        let extended = parse_date_time("2024-03-01T12:34:56").unwrap();
        let basic = parse_date_time("20240301T123456").unwrap();
        assert_eq!(extended.date, basic.date);
        assert_eq!(extended.time, basic.time);
        // Mixed separators are rejected.
        assert!(parse_date_time("2024-0301").is_err());
    }

    #[test]
    fn negative_year_zero_is_rejected() {
        assert!(parse_date_time("-000000-01-01").is_err());
        assert!(parse_date_time("+000000-01-01").is_ok());
        let ancient = parse_date_time("-002024-03-01").unwrap();
        assert_eq!(ancient.date.unwrap().year, -2024);
    }

    #[test]
    fn leap_second_clamps() {
        let parsed = parse_date_time("2024-06-30T23:59:60").unwrap();
        let time = parsed.time.unwrap();
        assert_eq!(time.second, 59);
        assert_eq!(time.nanosecond, 999_999_999);
        assert!(parse_date_time("2024-06-30T23:59:61").is_err());
    }

    #[test]
    fn critical_unknown_annotation_is_rejected() {
        assert!(parse_date_time("2024-03-01[u-ca=iso8601]").is_ok());
        assert!(parse_date_time("2024-03-01[wall=yes]").is_ok());
        assert!(parse_date_time("2024-03-01[!wall=yes]").is_err());
    }

    #[test]
    fn calendar_annotation_must_not_repeat() {
        assert!(parse_date_time("2024-03-01[u-ca=iso8601][u-ca=iso8601]").is_ok());
        assert!(parse_date_time("2024-03-01[u-ca=iso8601][!u-ca=gregory]").is_err());
    }

    #[test]
    fn civil_parsers_reject_the_z_designator() {
        assert!(parse_date_time("2024-03-01T00:00Z").is_err());
        assert!(parse_instant("2024-03-01T00:00Z").is_ok());
        assert!(parse_instant("2024-03-01T00:00").is_err());
        assert!(parse_instant("2024-03-01").is_err());
    }

    #[test]
    fn offsets_allow_sub_minute_only_in_the_offset_position() {
        let parsed = parse_date_time("2024-03-01T00:00+05:45:30.123").unwrap();
        match parsed.offset {
            Some(UtcOffsetRecordOrZ::Offset(offset)) => {
                assert!(offset.has_seconds);
                assert_eq!(offset.second, 30);
            }
            other => panic!("unexpected offset {other:?}"),
        }
        // An annotation offset is minute-precision.
        assert!(parse_zoned_date_time("2024-03-01T00:00[+05:45]").is_ok());
        assert!(parse_zoned_date_time("2024-03-01T00:00[+05:45:30]").is_err());
    }

    #[test]
    fn zoned_strings_require_an_annotation() {
        let parsed = parse_zoned_date_time("2024-03-01T00:00+01:00[Europe/Paris]").unwrap();
        match parsed.timezone.unwrap().tz {
            TimeZoneRecord::Named(name) => assert_eq!(name, "Europe/Paris"),
            other => panic!("unexpected zone {other:?}"),
        }
        assert!(parse_zoned_date_time("2024-03-01T00:00+01:00").is_err());
    }

    #[test]
    fn year_month_and_month_day_forms() {
        let ym = parse_year_month("2024-03").unwrap();
        assert_eq!(ym.date.unwrap().day, 1);
        let md = parse_month_day("--03-15").unwrap();
        assert_eq!(md.date.unwrap().year, 1972);
        assert_eq!(parse_month_day("0315").unwrap().date, md.date);
        // The day-less forms belong to the iso8601 calendar.
        assert!(parse_year_month("2024-03[u-ca=hebrew]").is_err());
        assert!(parse_month_day("03-15[u-ca=hebrew]").is_err());
    }

    #[test]
    fn duration_fractions_cascade_and_terminate() {
        let duration = parse_duration("P1DT0.5H").unwrap();
        assert_eq!(duration.minutes(), 30);
        assert!(parse_duration("PT0.5H30M").is_err());
        assert!(parse_duration("P1W1Y").is_err());
        assert!(parse_duration("P").is_err());
    }

    #[test]
    fn offset_magnitudes_are_validated() {
        assert!(parse_date_time("2024-03-01T00:00+24:00").is_err());
        assert!(parse_date_time("2024-03-01T00:00+23:60").is_err());
        assert!(parse_date_time("2024-03-01T00:00\u{2212}05:00").is_ok());
    }
}
