//! The [`PlainDateTime`] calendar date and wall-clock time type.

use alloc::string::String;
use core::str::FromStr;

use tinystr::TinyAsciiStr;

use crate::{
    calendar::{Calendar, MonthCode},
    duration::{DateDuration, Duration},
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{
        ArithmeticOverflow, DifferenceOperation, DifferenceSettings, DisplayCalendar,
        ResolvedRoundingOptions, RoundingOptions, ToStringRoundingOptions, Unit, UnitGroup,
    },
    parsers::{self, IsoStringBuilder},
    plain_date::{PartialDate, PlainDate},
    plain_time::{PartialTime, PlainTime},
    TemporaError, TemporaResult,
};

/// A calendar date combined with a wall-clock time, with no time zone
/// attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainDateTime {
    iso: IsoDateTime,
    calendar: Calendar,
}

impl PlainDateTime {
    pub(crate) const fn new_unchecked(iso: IsoDateTime, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    pub(crate) fn try_from_iso(
        date: IsoDate,
        time: IsoTime,
        calendar: Calendar,
    ) -> TemporaResult<Self> {
        Ok(Self::new_unchecked(IsoDateTime::new(date, time)?, calendar))
    }

    /// Creates a date-time from ISO fields in the given calendar,
    /// rejecting out-of-range fields.
    #[allow(clippy::too_many_arguments)]
    pub fn try_new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
        calendar: Calendar,
    ) -> TemporaResult<Self> {
        let date = IsoDate::new_with_overflow(
            year,
            i32::from(month),
            i32::from(day),
            ArithmeticOverflow::Reject,
        )?;
        let time = IsoTime::new_with_overflow(
            i32::from(hour),
            i32::from(minute),
            i32::from(second),
            i32::from(millisecond),
            i32::from(microsecond),
            i32::from(nanosecond),
            ArithmeticOverflow::Reject,
        )?;
        Self::try_from_iso(date, time, calendar)
    }

    /// Creates an ISO 8601 calendar date-time, rejecting out-of-range
    /// fields.
    #[allow(clippy::too_many_arguments)]
    pub fn try_new_iso(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
    ) -> TemporaResult<Self> {
        Self::try_new(
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            Calendar::default(),
        )
    }

    /// Creates a date-time by resolving calendar fields; an absent time
    /// partial reads as midnight.
    pub fn from_partial(
        date: PartialDate,
        time: Option<PartialTime>,
        calendar: Calendar,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        let iso_date = calendar.date_from_partial(&date, overflow.unwrap_or_default())?;
        let iso_time = match time {
            Some(partial) => PlainTime::from_partial(partial, overflow)?.iso(),
            None => IsoTime::default(),
        };
        Self::try_from_iso(iso_date, iso_time, calendar)
    }

    pub(crate) fn iso(&self) -> IsoDateTime {
        self.iso
    }

    /// The calendar of this date-time.
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    // calendar-dependent getters

    /// The era, if the calendar has eras.
    pub fn era(&self) -> TemporaResult<Option<TinyAsciiStr<16>>> {
        self.calendar.era(self.iso.date)
    }

    /// The year within the era, if the calendar has eras.
    pub fn era_year(&self) -> TemporaResult<Option<i32>> {
        self.calendar.era_year(self.iso.date)
    }

    /// The calendar year.
    pub fn year(&self) -> TemporaResult<i32> {
        self.calendar.year(self.iso.date)
    }

    /// The one-based ordinal month.
    pub fn month(&self) -> TemporaResult<u8> {
        self.calendar.month(self.iso.date)
    }

    /// The month code.
    pub fn month_code(&self) -> TemporaResult<MonthCode> {
        self.calendar.month_code(self.iso.date)
    }

    /// The day of the month.
    pub fn day(&self) -> TemporaResult<u8> {
        self.calendar.day(self.iso.date)
    }

    /// The ISO day of the week, Monday 1 through Sunday 7.
    pub fn day_of_week(&self) -> u8 {
        self.iso.date.day_of_week()
    }

    /// The ordinal day of the calendar year.
    pub fn day_of_year(&self) -> TemporaResult<u16> {
        self.calendar.day_of_year(self.iso.date)
    }

    /// The number of days in the calendar month.
    pub fn days_in_month(&self) -> TemporaResult<u8> {
        self.calendar.days_in_month(self.iso.date)
    }

    /// The number of days in the calendar year.
    pub fn days_in_year(&self) -> TemporaResult<u16> {
        self.calendar.days_in_year(self.iso.date)
    }

    /// The number of months in the calendar year.
    pub fn months_in_year(&self) -> TemporaResult<u8> {
        self.calendar.months_in_year(self.iso.date)
    }

    /// Whether the calendar year is a leap year.
    pub fn in_leap_year(&self) -> TemporaResult<bool> {
        self.calendar.in_leap_year(self.iso.date)
    }

    // clock getters

    /// The hour.
    pub fn hour(&self) -> u8 {
        self.iso.time.hour
    }

    /// The minute.
    pub fn minute(&self) -> u8 {
        self.iso.time.minute
    }

    /// The second.
    pub fn second(&self) -> u8 {
        self.iso.time.second
    }

    /// The millisecond.
    pub fn millisecond(&self) -> u16 {
        self.iso.time.millisecond
    }

    /// The microsecond.
    pub fn microsecond(&self) -> u16 {
        self.iso.time.microsecond
    }

    /// The nanosecond.
    pub fn nanosecond(&self) -> u16 {
        self.iso.time.nanosecond
    }

    /// This date-time with the set fields of the partials replaced.
    pub fn with(
        &self,
        date: PartialDate,
        time: Option<PartialTime>,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        if date.is_empty() && time.is_none_or(|partial| partial.is_empty()) {
            return Err(TemporaError::r#type()
                .with_message("a partial date-time must set at least one field"));
        }
        let merged_date = self.to_plain_date().merge_partial(date)?;
        let current = PlainTime::new_unchecked(self.iso.time);
        let merged_time = match time {
            Some(partial) if !partial.is_empty() => current.with(partial, overflow)?,
            _ => current,
        };
        let iso_date = self
            .calendar
            .date_from_partial(&merged_date, overflow.unwrap_or_default())?;
        Self::try_from_iso(iso_date, merged_time.iso(), self.calendar)
    }

    /// This date-time with the clock replaced; absent means midnight.
    pub fn with_time(&self, time: Option<PlainTime>) -> TemporaResult<Self> {
        Self::try_from_iso(
            self.iso.date,
            time.unwrap_or_default().iso(),
            self.calendar,
        )
    }

    /// This date-time in another calendar.
    #[must_use]
    pub fn with_calendar(&self, calendar: Calendar) -> Self {
        Self::new_unchecked(self.iso, calendar)
    }

    /// Adds a duration. The clock portion moves first; its day carry
    /// joins the calendar portion.
    pub fn add(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        let norm = duration.time().to_normalized()?;
        let (carry, time) = self.iso.time.add(norm);
        let days = duration
            .days()
            .checked_add(carry)
            .ok_or_else(|| TemporaError::range().with_message("duration is out of range"))?;
        let date_duration = DateDuration {
            years: duration.years(),
            months: duration.months(),
            weeks: duration.weeks(),
            days,
        };
        let date = self.calendar.date_add(
            self.iso.date,
            &date_duration,
            overflow.unwrap_or_default(),
        )?;
        Self::try_from_iso(date, time, self.calendar)
    }

    /// Subtracts a duration; the negation of [`Self::add`].
    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        self.add(&duration.negated(), overflow)
    }

    /// The duration from this date-time to `other`.
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporaResult<Duration> {
        self.diff(DifferenceOperation::Until, other, settings)
    }

    /// The duration from `other` to this date-time.
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporaResult<Duration> {
        self.diff(DifferenceOperation::Since, other, settings)
    }

    fn diff(
        &self,
        op: DifferenceOperation,
        other: &Self,
        settings: DifferenceSettings,
    ) -> TemporaResult<Duration> {
        if self.calendar != other.calendar {
            return Err(TemporaError::range()
                .with_message("date-times can only be differenced within one calendar"));
        }
        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            op,
            UnitGroup::DateTime,
            Unit::Day,
            Unit::Nanosecond,
        )?;
        let record = crate::duration::diff_iso_datetime_with_rounding(
            self.iso,
            other.iso,
            self.calendar,
            resolved,
        )?;
        let result = Duration::from_normalized(record, resolved.largest_unit)?;
        Ok(match op {
            DifferenceOperation::Until => result,
            DifferenceOperation::Since => result.negated(),
        })
    }

    /// Rounds the clock to an increment of a day or time unit; the day
    /// carry moves the date.
    pub fn round(&self, options: RoundingOptions) -> TemporaResult<Self> {
        let resolved = ResolvedRoundingOptions::from_dt_options(options)?;
        if resolved.is_noop() {
            return Ok(*self);
        }
        let (carry, time) = self.iso.time.round(resolved)?;
        let date = IsoDate::from_epoch_days(self.iso.date.to_epoch_days() + carry);
        Self::try_from_iso(date, time, self.calendar)
    }

    /// Orders two date-times by their ISO projection, ignoring
    /// calendars.
    pub fn compare_iso(&self, other: &Self) -> core::cmp::Ordering {
        self.iso
            .utc_epoch_nanoseconds()
            .cmp(&other.iso.utc_epoch_nanoseconds())
    }

    // conversions

    /// The date portion.
    #[must_use]
    pub fn to_plain_date(&self) -> PlainDate {
        PlainDate::new_unchecked(self.iso.date, self.calendar)
    }

    /// The clock portion.
    #[must_use]
    pub fn to_plain_time(&self) -> PlainTime {
        PlainTime::new_unchecked(self.iso.time)
    }

    /// Renders per the provided seconds precision and calendar display
    /// behavior.
    pub fn to_ixdtf_string(
        &self,
        options: ToStringRoundingOptions,
        display_calendar: DisplayCalendar,
    ) -> TemporaResult<String> {
        let resolved = options.resolve()?;
        let rounding = ResolvedRoundingOptions {
            largest_unit: resolved.smallest_unit,
            smallest_unit: resolved.smallest_unit,
            increment: resolved.increment,
            rounding_mode: resolved.rounding_mode,
        };
        let (carry, time) = self.iso.time.round(rounding)?;
        let date = IsoDate::from_epoch_days(self.iso.date.to_epoch_days() + carry);
        if !IsoDateTime::new_unchecked(date, time).is_within_limits() {
            return Err(
                TemporaError::range().with_message("date-time is outside the supported range")
            );
        }
        Ok(IsoStringBuilder::default()
            .with_date(date)
            .with_time(time, resolved.precision)
            .with_calendar(self.calendar.identifier(), display_calendar)
            .build())
    }
}

impl FromStr for PlainDateTime {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = parsers::parse_date_time(s)?;
        let record = parsed.date.ok_or_else(|| {
            TemporaError::range().with_message("string does not contain a date")
        })?;
        let calendar = parsed
            .calendar
            .map(|id| Calendar::from_utf8(id.as_bytes()))
            .transpose()?
            .unwrap_or_default();
        let time = parsed
            .time
            .map(PlainTime::from)
            .unwrap_or_default();
        Self::try_from_iso(
            IsoDate::new_unchecked(record.year, record.month, record.day),
            time.iso(),
            calendar,
        )
    }
}

impl core::fmt::Display for PlainDateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(
            &IsoStringBuilder::default()
                .with_date(self.iso.date)
                .with_time(self.iso.time, crate::options::Precision::Auto)
                .with_calendar(self.calendar.identifier(), DisplayCalendar::Auto)
                .build(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RoundingMode;
    use alloc::string::ToString;

    #[test]
    fn construction_and_display() {
        let dt = PlainDateTime::try_new_iso(2024, 2, 29, 12, 30, 0, 0, 0, 0).unwrap();
        assert_eq!(dt.to_string(), "2024-02-29T12:30:00");
        assert!(PlainDateTime::try_new_iso(2023, 2, 29, 0, 0, 0, 0, 0, 0).is_err());
    }

    #[test]
    fn add_carries_clock_overflow_into_the_date() {
        let dt = PlainDateTime::try_new_iso(2024, 1, 31, 23, 0, 0, 0, 0, 0).unwrap();
        let moved = dt
            .add(&Duration::new(0, 1, 0, 0, 2, 0, 0, 0, 0, 0).unwrap(), None)
            .unwrap();
        // 23:00 + 2h carries a day before the month is added.
        assert_eq!(moved.to_string(), "2024-03-01T01:00:00");
    }

    #[test]
    fn until_balances_through_the_clock() {
        let a = PlainDateTime::try_new_iso(2024, 1, 1, 22, 0, 0, 0, 0, 0).unwrap();
        let b = PlainDateTime::try_new_iso(2024, 1, 3, 1, 30, 0, 0, 0, 0).unwrap();
        let until = a.until(&b, DifferenceSettings::default()).unwrap();
        assert_eq!(
            (until.days(), until.hours(), until.minutes()),
            (1, 3, 30)
        );
        let since = a.since(&b, DifferenceSettings::default()).unwrap();
        assert_eq!((since.days(), since.hours()), (-1, -3));
    }

    #[test]
    fn round_to_day_moves_the_date() {
        let dt = PlainDateTime::try_new_iso(2024, 1, 1, 12, 0, 0, 0, 0, 0).unwrap();
        let rounded = dt
            .round(RoundingOptions {
                smallest_unit: Some(Unit::Day),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(rounded.to_string(), "2024-01-02T00:00:00");

        let down = dt
            .round(RoundingOptions {
                smallest_unit: Some(Unit::Day),
                rounding_mode: Some(RoundingMode::Trunc),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(down.to_string(), "2024-01-01T00:00:00");
    }

    #[test]
    fn with_merges_both_portions() {
        let dt = PlainDateTime::try_new_iso(2024, 1, 31, 1, 2, 3, 0, 0, 0).unwrap();
        let replaced = dt
            .with(
                PartialDate {
                    month: Some(2),
                    ..Default::default()
                },
                Some(PartialTime {
                    hour: Some(12),
                    ..Default::default()
                }),
                None,
            )
            .unwrap();
        assert_eq!(replaced.to_string(), "2024-02-29T12:02:03");
        assert!(dt.with(PartialDate::default(), None, None).is_err());
    }

    #[test]
    fn parse_defaults_to_midnight() {
        let dt = PlainDateTime::from_str("2024-03-01").unwrap();
        assert_eq!(dt.to_string(), "2024-03-01T00:00:00");
        let full = PlainDateTime::from_str("2024-03-01T08:15:30.25[u-ca=gregory]").unwrap();
        assert_eq!(full.to_string(), "2024-03-01T08:15:30.25[u-ca=gregory]");
        assert!(PlainDateTime::from_str("2024-03-01T00:00Z").is_err());
    }

    #[test]
    fn string_precision_control() {
        let dt = PlainDateTime::try_new_iso(2024, 3, 1, 8, 15, 30, 250, 0, 0).unwrap();
        let out = dt
            .to_ixdtf_string(
                ToStringRoundingOptions {
                    precision: crate::options::Precision::Digit(1),
                    ..Default::default()
                },
                DisplayCalendar::Never,
            )
            .unwrap();
        assert_eq!(out, "2024-03-01T08:15:30.2");
    }
}
