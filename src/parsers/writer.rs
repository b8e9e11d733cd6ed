//! `Writeable` renderers for the interchange formats.

use crate::{
    duration::Duration,
    iso::{IsoDate, IsoTime},
    options::{DisplayCalendar, DisplayOffset, DisplayTimeZone, Precision},
    Sign,
};
use alloc::string::String;
use writeable::{impl_display_with_writeable, LengthHint, Writeable};

/// A builder assembling the components of an interchange string.
#[derive(Debug, Default)]
pub struct IsoStringBuilder<'a> {
    inner: FormattableDateTime<'a>,
}

impl<'a> IsoStringBuilder<'a> {
    /// Includes a calendar date.
    #[must_use]
    pub fn with_date(mut self, iso: IsoDate) -> Self {
        self.inner.date = Some(FormattableDate(iso.year, iso.month, iso.day));
        self
    }

    /// Includes a wall-clock time at the given precision.
    #[must_use]
    pub fn with_time(mut self, time: IsoTime, precision: Precision) -> Self {
        let nanosecond = u32::from(time.millisecond) * 1_000_000
            + u32::from(time.microsecond) * 1_000
            + u32::from(time.nanosecond);
        self.inner.time = Some(FormattableTime {
            hour: time.hour,
            minute: time.minute,
            second: time.second,
            nanosecond,
            precision,
            include_sep: true,
        });
        self
    }

    /// Includes a minute-precision UTC offset.
    #[must_use]
    pub fn with_minute_offset(mut self, sign: Sign, hour: u8, minute: u8, show: DisplayOffset) -> Self {
        let time = FormattableTime {
            hour,
            minute,
            second: 0,
            nanosecond: 0,
            precision: Precision::Minute,
            include_sep: true,
        };
        self.inner.utc_offset = Some(FormattableUtcOffset {
            show,
            offset: FormattableOffsetKind::Offset(FormattableOffset { sign, time }),
        });
        self
    }

    /// Includes the UTC designator.
    #[must_use]
    pub fn with_z(mut self, show: DisplayOffset) -> Self {
        self.inner.utc_offset = Some(FormattableUtcOffset {
            show,
            offset: FormattableOffsetKind::Z,
        });
        self
    }

    /// Includes a time zone annotation.
    #[must_use]
    pub fn with_timezone(mut self, timezone: &'a str, show: DisplayTimeZone) -> Self {
        self.inner.timezone = Some(FormattableTimeZone { show, timezone });
        self
    }

    /// Includes a calendar annotation.
    #[must_use]
    pub fn with_calendar(mut self, calendar: &'static str, show: DisplayCalendar) -> Self {
        self.inner.calendar = Some(FormattableCalendar { show, calendar });
        self
    }

    /// Renders the assembled components.
    #[must_use]
    pub fn build(self) -> String {
        self.inner.write_to_string().into_owned()
    }
}

impl Writeable for IsoStringBuilder<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        self.inner.write_to(sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        self.inner.writeable_length_hint()
    }
}

/// A calendar date as `year`, `month`, `day`.
#[derive(Debug)]
pub struct FormattableDate(pub i32, pub u8, pub u8);

impl Writeable for FormattableDate {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        write_year(self.0, sink)?;
        sink.write_char('-')?;
        write_padded_u8(self.1, sink)?;
        sink.write_char('-')?;
        write_padded_u8(self.2, sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        let year_length = if (0..=9999).contains(&self.0) { 4 } else { 7 };
        LengthHint::exact(6 + year_length)
    }
}

/// A wall-clock time with sub-second precision control.
#[derive(Debug)]
pub struct FormattableTime {
    /// The hour.
    pub hour: u8,
    /// The minute.
    pub minute: u8,
    /// The second.
    pub second: u8,
    /// The combined sub-second component.
    pub nanosecond: u32,
    /// The seconds precision.
    pub precision: Precision,
    /// Whether to separate components with colons.
    pub include_sep: bool,
}

impl Writeable for FormattableTime {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        write_padded_u8(self.hour, sink)?;
        if self.include_sep {
            sink.write_char(':')?;
        }
        write_padded_u8(self.minute, sink)?;
        if self.precision == Precision::Minute {
            return Ok(());
        }
        if self.include_sep {
            sink.write_char(':')?;
        }
        write_padded_u8(self.second, sink)?;
        if (self.nanosecond == 0 && self.precision == Precision::Auto)
            || self.precision == Precision::Digit(0)
        {
            return Ok(());
        }
        sink.write_char('.')?;
        write_nanosecond(self.nanosecond, self.precision, sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        let sep = self.include_sep as usize;
        if self.precision == Precision::Minute {
            return LengthHint::exact(4 + sep);
        }
        let base = 6 + sep * 2;
        if self.nanosecond == 0 || self.precision == Precision::Digit(0) {
            return LengthHint::exact(base);
        }
        if let Precision::Digit(d) = self.precision {
            return LengthHint::exact(base + 1 + d as usize);
        }
        LengthHint::between(base + 2, base + 10)
    }
}

/// A UTC offset or the `Z` designator, with display control.
#[derive(Debug)]
pub struct FormattableUtcOffset {
    /// Whether to emit the offset at all.
    pub show: DisplayOffset,
    /// The offset value.
    pub offset: FormattableOffsetKind,
}

/// Either the UTC designator or a numeric offset.
#[derive(Debug)]
pub enum FormattableOffsetKind {
    /// The `Z` designator.
    Z,
    /// A signed numeric offset.
    Offset(FormattableOffset),
}

impl Writeable for FormattableUtcOffset {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.show == DisplayOffset::Never {
            return Ok(());
        }
        match &self.offset {
            FormattableOffsetKind::Z => sink.write_char('Z'),
            FormattableOffsetKind::Offset(offset) => offset.write_to(sink),
        }
    }

    fn writeable_length_hint(&self) -> LengthHint {
        match &self.offset {
            FormattableOffsetKind::Z => LengthHint::exact(1),
            FormattableOffsetKind::Offset(o) => o.writeable_length_hint(),
        }
    }
}

/// A signed numeric UTC offset.
#[derive(Debug)]
pub struct FormattableOffset {
    /// The sign of the offset.
    pub sign: Sign,
    /// The magnitude, rendered as a time.
    pub time: FormattableTime,
}

impl Writeable for FormattableOffset {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        match self.sign {
            Sign::Negative => sink.write_char('-')?,
            _ => sink.write_char('+')?,
        }
        self.time.write_to(sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        self.time.writeable_length_hint() + 1
    }
}

/// A time zone annotation with display control.
#[derive(Debug)]
pub struct FormattableTimeZone<'a> {
    /// Whether to emit the annotation.
    pub show: DisplayTimeZone,
    /// The zone identifier.
    pub timezone: &'a str,
}

impl Writeable for FormattableTimeZone<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.show == DisplayTimeZone::Never {
            return Ok(());
        }
        sink.write_char('[')?;
        if self.show == DisplayTimeZone::Critical {
            sink.write_char('!')?;
        }
        sink.write_str(self.timezone)?;
        sink.write_char(']')
    }

    fn writeable_length_hint(&self) -> LengthHint {
        if self.show == DisplayTimeZone::Never {
            return LengthHint::exact(0);
        }
        let critical = (self.show == DisplayTimeZone::Critical) as usize;
        LengthHint::exact(2 + critical + self.timezone.len())
    }
}

/// A calendar annotation with display control.
#[derive(Debug)]
pub struct FormattableCalendar<'a> {
    /// Whether to emit the annotation.
    pub show: DisplayCalendar,
    /// The calendar identifier.
    pub calendar: &'a str,
}

impl FormattableCalendar<'_> {
    fn is_elided(&self) -> bool {
        self.show == DisplayCalendar::Never
            || self.show == DisplayCalendar::Auto && self.calendar == "iso8601"
    }

    fn forces_full_date(&self) -> bool {
        self.show == DisplayCalendar::Always
            || self.show == DisplayCalendar::Critical
            || self.calendar != "iso8601"
    }
}

impl Writeable for FormattableCalendar<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.is_elided() {
            return Ok(());
        }
        sink.write_char('[')?;
        if self.show == DisplayCalendar::Critical {
            sink.write_char('!')?;
        }
        sink.write_str("u-ca=")?;
        sink.write_str(self.calendar)?;
        sink.write_char(']')
    }

    fn writeable_length_hint(&self) -> LengthHint {
        if self.is_elided() {
            return LengthHint::exact(0);
        }
        let critical = (self.show == DisplayCalendar::Critical) as usize;
        LengthHint::exact(7 + critical + self.calendar.len())
    }
}

/// A month-day, emitting the reference year only when the calendar
/// annotation appears.
#[derive(Debug)]
pub struct FormattableMonthDay<'a> {
    /// The backing date.
    pub date: FormattableDate,
    /// The calendar annotation.
    pub calendar: FormattableCalendar<'a>,
}

impl Writeable for FormattableMonthDay<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.calendar.forces_full_date() {
            write_year(self.date.0, sink)?;
            sink.write_char('-')?;
        }
        write_padded_u8(self.date.1, sink)?;
        sink.write_char('-')?;
        write_padded_u8(self.date.2, sink)?;
        self.calendar.write_to(sink)
    }
}

/// A year-month, emitting the day only when the calendar annotation
/// appears.
#[derive(Debug)]
pub struct FormattableYearMonth<'a> {
    /// The backing date.
    pub date: FormattableDate,
    /// The calendar annotation.
    pub calendar: FormattableCalendar<'a>,
}

impl Writeable for FormattableYearMonth<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        write_year(self.date.0, sink)?;
        sink.write_char('-')?;
        write_padded_u8(self.date.1, sink)?;
        if self.calendar.forces_full_date() {
            sink.write_char('-')?;
            write_padded_u8(self.date.2, sink)?;
        }
        self.calendar.write_to(sink)
    }
}

/// The components of an interchange string, each optional.
#[derive(Debug, Default)]
pub struct FormattableDateTime<'a> {
    /// The calendar date.
    pub date: Option<FormattableDate>,
    /// The wall-clock time.
    pub time: Option<FormattableTime>,
    /// The UTC offset.
    pub utc_offset: Option<FormattableUtcOffset>,
    /// The time zone annotation.
    pub timezone: Option<FormattableTimeZone<'a>>,
    /// The calendar annotation.
    pub calendar: Option<FormattableCalendar<'a>>,
}

impl Writeable for FormattableDateTime<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if let Some(date) = &self.date {
            date.write_to(sink)?;
        }
        if let Some(time) = &self.time {
            if self.date.is_some() {
                sink.write_char('T')?;
            }
            time.write_to(sink)?;
        }
        if let Some(offset) = &self.utc_offset {
            offset.write_to(sink)?;
        }
        if let Some(timezone) = &self.timezone {
            timezone.write_to(sink)?;
        }
        if let Some(calendar) = &self.calendar {
            calendar.write_to(sink)?;
        }
        Ok(())
    }

    fn writeable_length_hint(&self) -> LengthHint {
        let mut hint = LengthHint::exact(0);
        if let Some(date) = &self.date {
            hint = hint + date.writeable_length_hint();
        }
        if let Some(time) = &self.time {
            hint = hint + time.writeable_length_hint() + self.date.is_some() as usize;
        }
        if let Some(offset) = &self.utc_offset {
            hint = hint + offset.writeable_length_hint();
        }
        if let Some(timezone) = &self.timezone {
            hint = hint + timezone.writeable_length_hint();
        }
        if let Some(calendar) = &self.calendar {
            hint = hint + calendar.writeable_length_hint();
        }
        hint
    }
}

/// A duration together with its seconds precision.
#[derive(Debug)]
pub struct FormattableDuration<'a> {
    /// The duration to render.
    pub duration: &'a Duration,
    /// The seconds precision.
    pub precision: Precision,
}

impl Writeable for FormattableDuration<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.duration.sign() == Sign::Negative {
            sink.write_char('-')?;
        }
        sink.write_char('P')?;
        let duration = self.duration.abs();

        let mut wrote_date = false;
        for (value, suffix) in [
            (duration.years(), 'Y'),
            (duration.months(), 'M'),
            (duration.weeks(), 'W'),
            (duration.days(), 'D'),
        ] {
            if value != 0 {
                (value as u64).write_to(sink)?;
                sink.write_char(suffix)?;
                wrote_date = true;
            }
        }

        let hours = duration.hours() as u64;
        let minutes = duration.minutes() as u64;
        // Seconds and the sub-second fields render as one decimal
        // quantity.
        let sub_second_total = duration.seconds() as u128 * 1_000_000_000
            + duration.milliseconds() as u128 * 1_000_000
            + duration.microseconds() as u128 * 1_000
            + duration.nanoseconds() as u128;
        let seconds = sub_second_total / 1_000_000_000;
        let fraction = (sub_second_total % 1_000_000_000) as u32;

        let write_seconds = self.precision != Precision::Minute
            && (seconds != 0
                || fraction != 0
                || matches!(self.precision, Precision::Digit(_))
                || (!wrote_date && hours == 0 && minutes == 0));

        if hours != 0 || minutes != 0 || write_seconds {
            sink.write_char('T')?;
        }
        if hours != 0 {
            hours.write_to(sink)?;
            sink.write_char('H')?;
        }
        if minutes != 0 {
            minutes.write_to(sink)?;
            sink.write_char('M')?;
        }
        if write_seconds {
            seconds.write_to(sink)?;
            if self.precision == Precision::Digit(0)
                || (self.precision == Precision::Auto && fraction == 0)
            {
                sink.write_char('S')?;
                return Ok(());
            }
            sink.write_char('.')?;
            write_nanosecond(fraction, self.precision, sink)?;
            sink.write_char('S')?;
        } else if !wrote_date && hours == 0 && minutes == 0 {
            // The zero duration at minute precision still needs a
            // nonempty body.
            sink.write_str("T0S")?;
        }
        Ok(())
    }
}

impl_display_with_writeable!(IsoStringBuilder<'_>);
impl_display_with_writeable!(FormattableDateTime<'_>);
impl_display_with_writeable!(FormattableMonthDay<'_>);
impl_display_with_writeable!(FormattableYearMonth<'_>);
impl_display_with_writeable!(FormattableDuration<'_>);
impl_display_with_writeable!(FormattableDate);
impl_display_with_writeable!(FormattableTime);
impl_display_with_writeable!(FormattableUtcOffset);
impl_display_with_writeable!(FormattableOffset);
impl_display_with_writeable!(FormattableTimeZone<'_>);
impl_display_with_writeable!(FormattableCalendar<'_>);

pub(crate) fn write_padded_u8<W: core::fmt::Write + ?Sized>(
    num: u8,
    sink: &mut W,
) -> core::fmt::Result {
    if num < 10 {
        sink.write_char('0')?;
    }
    num.write_to(sink)
}

fn write_nanosecond<W: core::fmt::Write + ?Sized>(
    nanoseconds: u32,
    precision: Precision,
    sink: &mut W,
) -> core::fmt::Result {
    let (digits, trimmed) = u32_to_digits(nanoseconds);
    let precision = match precision {
        Precision::Digit(digit) if digit <= 9 => digit as usize,
        _ => trimmed,
    };
    write_digit_slice(&digits, 0, precision, sink)
}

/// Splits a sub-second value into its nine decimal digits, returning
/// the digit count with trailing zeros trimmed.
fn u32_to_digits(mut value: u32) -> ([u8; 9], usize) {
    let mut output = [0; 9];
    let mut trimmed = 0;
    let mut i = 9;
    while i != 0 {
        let v = (value % 10) as u8;
        value /= 10;
        if trimmed == 0 && v != 0 {
            trimmed = i;
        }
        output[i - 1] = v;
        i -= 1;
    }
    (output, trimmed)
}

fn write_digit_slice<W: core::fmt::Write + ?Sized>(
    digits: &[u8; 9],
    from: usize,
    to: usize,
    sink: &mut W,
) -> core::fmt::Result {
    for digit in digits.iter().take(to).skip(from) {
        digit.write_to(sink)?;
    }
    Ok(())
}

pub(crate) fn write_year<W: core::fmt::Write + ?Sized>(
    year: i32,
    sink: &mut W,
) -> core::fmt::Result {
    if (0..=9999).contains(&year) {
        write_four_digit_year(year, sink)
    } else {
        write_extended_year(year, sink)
    }
}

fn write_four_digit_year<W: core::fmt::Write + ?Sized>(
    mut y: i32,
    sink: &mut W,
) -> core::fmt::Result {
    (y / 1_000).write_to(sink)?;
    y %= 1_000;
    (y / 100).write_to(sink)?;
    y %= 100;
    (y / 10).write_to(sink)?;
    y %= 10;
    y.write_to(sink)
}

fn write_extended_year<W: core::fmt::Write + ?Sized>(y: i32, sink: &mut W) -> core::fmt::Result {
    let sign = if y < 0 { '-' } else { '+' };
    sink.write_char(sign)?;
    let (digits, _) = u32_to_digits(y.unsigned_abs());
    write_digit_slice(&digits, 3, 9, sink)
}
