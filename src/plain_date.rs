//! The [`PlainDate`] calendar date type.

use alloc::string::String;
use core::str::FromStr;

use tinystr::TinyAsciiStr;

use crate::{
    calendar::{Calendar, MonthCode},
    duration::{DateDuration, Duration},
    iso::IsoDate,
    month_day::PlainMonthDay,
    options::{
        ArithmeticOverflow, DifferenceOperation, DifferenceSettings, DisplayCalendar,
        ResolvedRoundingOptions, Unit, UnitGroup,
    },
    parsers::{self, IsoStringBuilder},
    plain_date_time::PlainDateTime,
    plain_time::PlainTime,
    year_month::PlainYearMonth,
    TemporaError, TemporaResult, NS_PER_DAY,
};

/// A calendar date with no time or time zone attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainDate {
    iso: IsoDate,
    calendar: Calendar,
}

/// A calendar date where every field is optional.
///
/// The year may be spelled as an arithmetic `year` or as an `era` and
/// `era_year` pair; the month as an ordinal `month` or a `month_code`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PartialDate {
    /// The arithmetic year.
    pub year: Option<i32>,
    /// The one-based ordinal month.
    pub month: Option<u8>,
    /// The month code.
    pub month_code: Option<MonthCode>,
    /// The day of the month.
    pub day: Option<u8>,
    /// The era identifier.
    pub era: Option<TinyAsciiStr<19>>,
    /// The year within the era.
    pub era_year: Option<i32>,
}

impl PartialDate {
    /// Whether no field has been set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl PlainDate {
    pub(crate) const fn new_unchecked(iso: IsoDate, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    pub(crate) fn try_from_iso(iso: IsoDate, calendar: Calendar) -> TemporaResult<Self> {
        if !iso.is_within_limits() {
            return Err(
                TemporaError::range().with_message("date is outside the supported range")
            );
        }
        Ok(Self::new_unchecked(iso, calendar))
    }

    /// Creates a date from ISO fields in the given calendar, rejecting
    /// out-of-range fields.
    pub fn try_new(year: i32, month: u8, day: u8, calendar: Calendar) -> TemporaResult<Self> {
        Self::new_with_overflow(
            year,
            i32::from(month),
            i32::from(day),
            calendar,
            ArithmeticOverflow::Reject,
        )
    }

    /// Creates an ISO 8601 calendar date, rejecting out-of-range
    /// fields.
    pub fn try_new_iso(year: i32, month: u8, day: u8) -> TemporaResult<Self> {
        Self::try_new(year, month, day, Calendar::default())
    }

    /// Creates a date from ISO fields, regulating them per the overflow
    /// behavior.
    pub fn new_with_overflow(
        year: i32,
        month: i32,
        day: i32,
        calendar: Calendar,
        overflow: ArithmeticOverflow,
    ) -> TemporaResult<Self> {
        let iso = IsoDate::new_with_overflow(year, month, day, overflow)?;
        Self::try_from_iso(iso, calendar)
    }

    /// Creates a date by resolving calendar fields.
    pub fn from_partial(
        partial: PartialDate,
        calendar: Calendar,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        let iso = calendar.date_from_partial(&partial, overflow.unwrap_or_default())?;
        Self::try_from_iso(iso, calendar)
    }

    pub(crate) fn iso(&self) -> IsoDate {
        self.iso
    }

    /// The calendar of this date.
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    // calendar-dependent getters

    /// The era, if the calendar has eras.
    pub fn era(&self) -> TemporaResult<Option<TinyAsciiStr<16>>> {
        self.calendar.era(self.iso)
    }

    /// The year within the era, if the calendar has eras.
    pub fn era_year(&self) -> TemporaResult<Option<i32>> {
        self.calendar.era_year(self.iso)
    }

    /// The calendar year.
    pub fn year(&self) -> TemporaResult<i32> {
        self.calendar.year(self.iso)
    }

    /// The one-based ordinal month.
    pub fn month(&self) -> TemporaResult<u8> {
        self.calendar.month(self.iso)
    }

    /// The month code.
    pub fn month_code(&self) -> TemporaResult<MonthCode> {
        self.calendar.month_code(self.iso)
    }

    /// The day of the month.
    pub fn day(&self) -> TemporaResult<u8> {
        self.calendar.day(self.iso)
    }

    /// The ISO day of the week, Monday 1 through Sunday 7.
    pub fn day_of_week(&self) -> u8 {
        self.iso.day_of_week()
    }

    /// The ordinal day of the calendar year.
    pub fn day_of_year(&self) -> TemporaResult<u16> {
        self.calendar.day_of_year(self.iso)
    }

    /// The number of days in a week.
    pub fn days_in_week(&self) -> u8 {
        7
    }

    /// The number of days in the calendar month.
    pub fn days_in_month(&self) -> TemporaResult<u8> {
        self.calendar.days_in_month(self.iso)
    }

    /// The number of days in the calendar year.
    pub fn days_in_year(&self) -> TemporaResult<u16> {
        self.calendar.days_in_year(self.iso)
    }

    /// The number of months in the calendar year.
    pub fn months_in_year(&self) -> TemporaResult<u8> {
        self.calendar.months_in_year(self.iso)
    }

    /// Whether the calendar year is a leap year.
    pub fn in_leap_year(&self) -> TemporaResult<bool> {
        self.calendar.in_leap_year(self.iso)
    }

    /// This date with the set fields of the partial replaced.
    pub fn with(
        &self,
        partial: PartialDate,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        if partial.is_empty() {
            return Err(TemporaError::r#type()
                .with_message("a partial date must set at least one field"));
        }
        let merged = self.merge_partial(partial)?;
        Self::from_partial(merged, self.calendar, overflow)
    }

    pub(crate) fn merge_partial(&self, partial: PartialDate) -> TemporaResult<PartialDate> {
        let mut merged = partial;
        if merged.year.is_none() && merged.era.is_none() {
            merged.year = Some(self.year()?);
        }
        if merged.month.is_none() && merged.month_code.is_none() {
            merged.month_code = Some(self.month_code()?);
        }
        if merged.day.is_none() {
            merged.day = Some(self.day()?);
        }
        Ok(merged)
    }

    /// This date in another calendar.
    #[must_use]
    pub fn with_calendar(&self, calendar: Calendar) -> Self {
        Self::new_unchecked(self.iso, calendar)
    }

    /// Adds a duration. Years and months move in calendar space; the
    /// clock portion contributes whole days only.
    pub fn add(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        let norm = duration.time().to_normalized()?;
        let extra_days = i64::try_from(norm.0 / i128::from(NS_PER_DAY))
            .map_err(|_| TemporaError::range().with_message("duration is out of range"))?;
        let days = duration
            .days()
            .checked_add(extra_days)
            .ok_or_else(|| TemporaError::range().with_message("duration is out of range"))?;
        let date = DateDuration {
            years: duration.years(),
            months: duration.months(),
            weeks: duration.weeks(),
            days,
        };
        let added = self
            .calendar
            .date_add(self.iso, &date, overflow.unwrap_or_default())?;
        Self::try_from_iso(added, self.calendar)
    }

    /// Subtracts a duration; the negation of [`Self::add`].
    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        self.add(&duration.negated(), overflow)
    }

    /// The duration from this date to `other`, in date units.
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporaResult<Duration> {
        self.diff(DifferenceOperation::Until, other, settings)
    }

    /// The duration from `other` to this date.
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
                .with_message("dates can only be differenced within one calendar"));
        }
        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            op,
            UnitGroup::Date,
            Unit::Day,
            Unit::Day,
        )?;
        let record = crate::duration::diff_iso_datetime_with_rounding(
            self.to_plain_date_time(None)?.iso(),
            other.to_plain_date_time(None)?.iso(),
            self.calendar,
            resolved,
        )?;
        let result = Duration::from_normalized(record, resolved.largest_unit)?;
        Ok(match op {
            DifferenceOperation::Until => result,
            DifferenceOperation::Since => result.negated(),
        })
    }

    /// Orders two dates by their ISO projection, ignoring calendars.
    pub fn compare_iso(&self, other: &Self) -> core::cmp::Ordering {
        self.iso.cmp(&other.iso)
    }

    // conversions

    /// Combines with a time, at midnight when none is given.
    pub fn to_plain_date_time(&self, time: Option<PlainTime>) -> TemporaResult<PlainDateTime> {
        PlainDateTime::try_from_iso(
            self.iso,
            time.unwrap_or_default().iso(),
            self.calendar,
        )
    }

    /// The year-month this date falls in.
    pub fn to_year_month(&self) -> TemporaResult<PlainYearMonth> {
        PlainYearMonth::from_partial(self.to_partial()?, self.calendar, None)
    }

    /// The month-day this date falls on.
    pub fn to_month_day(&self) -> TemporaResult<PlainMonthDay> {
        PlainMonthDay::from_partial(self.to_partial()?, self.calendar, None)
    }

    fn to_partial(&self) -> TemporaResult<PartialDate> {
        Ok(PartialDate {
            year: Some(self.year()?),
            month_code: Some(self.month_code()?),
            day: Some(self.day()?),
            ..Default::default()
        })
    }

    /// Renders with the given calendar display behavior.
    #[must_use]
    pub fn to_ixdtf_string(&self, display_calendar: DisplayCalendar) -> String {
        IsoStringBuilder::default()
            .with_date(self.iso)
            .with_calendar(self.calendar.identifier(), display_calendar)
            .build()
    }
}

impl FromStr for PlainDate {
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
        Self::try_from_iso(
            IsoDate::new_unchecked(record.year, record.month, record.day),
            calendar,
        )
    }
}

impl core::fmt::Display for PlainDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_ixdtf_string(DisplayCalendar::Auto))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn construction_and_getters() {
        let date = PlainDate::try_new_iso(2024, 2, 29).unwrap();
        assert_eq!(date.year().unwrap(), 2024);
        assert_eq!(date.month_code().unwrap().as_str(), "M02");
        assert_eq!(date.day_of_week(), 4);
        assert!(date.in_leap_year().unwrap());

        assert!(PlainDate::try_new_iso(2023, 2, 29).is_err());
        let constrained = PlainDate::new_with_overflow(
            2023,
            2,
            29,
            Calendar::default(),
            ArithmeticOverflow::Constrain,
        )
        .unwrap();
        assert_eq!(constrained.day().unwrap(), 28);
    }

    #[test]
    fn month_addition_clamps_at_month_end() {
        let date = PlainDate::try_new_iso(2024, 1, 31).unwrap();
        let one_month = Duration::from_date_values(0, 1, 0, 0).unwrap();
        let added = date.add(&one_month, None).unwrap();
        assert_eq!(added.to_string(), "2024-02-29");
        assert!(date
            .add(&one_month, Some(ArithmeticOverflow::Reject))
            .is_err());
    }

    #[test]
    fn time_portion_contributes_whole_days() {
        let date = PlainDate::try_new_iso(2000, 5, 2).unwrap();
        let duration = Duration::new(0, 0, 0, 1, 25, 0, 0, 0, 0, 0).unwrap();
        assert_eq!(date.add(&duration, None).unwrap().to_string(), "2000-05-04");
    }

    #[test]
    fn until_and_since() {
        let a = PlainDate::try_new_iso(2000, 5, 2).unwrap();
        let b = PlainDate::try_new_iso(2001, 6, 1).unwrap();
        let until = a
            .until(
                &b,
                DifferenceSettings {
                    largest_unit: Some(Unit::Year),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!((until.years(), until.months(), until.days()), (1, 0, 30));

        let days = a.until(&b, DifferenceSettings::default()).unwrap();
        assert_eq!(days.days(), 395);

        let since = a
            .since(
                &b,
                DifferenceSettings {
                    largest_unit: Some(Unit::Year),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!((since.years(), since.days()), (-1, -30));
    }

    #[test]
    fn with_replaces_fields() {
        let date = PlainDate::try_new_iso(2024, 1, 31).unwrap();
        let replaced = date
            .with(
                PartialDate {
                    month: Some(2),
                    ..Default::default()
                },
                None,
            )
            .unwrap();
        assert_eq!(replaced.to_string(), "2024-02-29");
        assert!(date.with(PartialDate::default(), None).is_err());
    }

    #[test]
    fn string_round_trip() {
        let date = PlainDate::from_str("2024-03-01").unwrap();
        assert_eq!(date.to_string(), "2024-03-01");

        let annotated = PlainDate::from_str("2024-03-01[u-ca=gregory]").unwrap();
        assert_eq!(annotated.calendar().identifier(), "gregory");
        assert_eq!(annotated.to_string(), "2024-03-01[u-ca=gregory]");

        // The Z designator is not a civil reading.
        assert!(PlainDate::from_str("2024-03-01T00:00Z").is_err());
        // An unknown critical annotation must not be ignored.
        assert!(PlainDate::from_str("2024-03-01[!u-unknown=yes]").is_err());
    }
}
