//! The [`PlainYearMonth`] calendar month type.

use alloc::string::String;
use core::str::FromStr;

use tinystr::TinyAsciiStr;

use crate::{
    calendar::{Calendar, MonthCode},
    duration::{DateDuration, Duration},
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{
        ArithmeticOverflow, DifferenceOperation, DifferenceSettings, DisplayCalendar,
        ResolvedRoundingOptions, Unit, UnitGroup,
    },
    parsers::{self, FormattableCalendar, FormattableDate, FormattableYearMonth},
    plain_date::{PartialDate, PlainDate},
    Sign, TemporaError, TemporaResult, NS_PER_DAY,
};

/// A calendar year and month with no day attached.
///
/// The backing ISO date holds the first day of the calendar month as
/// its reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainYearMonth {
    iso: IsoDate,
    calendar: Calendar,
}

impl PlainYearMonth {
    pub(crate) const fn new_unchecked(iso: IsoDate, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    fn try_from_iso(iso: IsoDate, calendar: Calendar) -> TemporaResult<Self> {
        if !iso.is_within_limits() {
            return Err(
                TemporaError::range().with_message("date is outside the supported range")
            );
        }
        Ok(Self::new_unchecked(iso, calendar))
    }

    /// Creates an ISO 8601 calendar year-month, rejecting an
    /// out-of-range month.
    pub fn try_new_iso(year: i32, month: u8) -> TemporaResult<Self> {
        let iso = IsoDate::new_with_overflow(
            year,
            i32::from(month),
            1,
            ArithmeticOverflow::Reject,
        )?;
        Self::try_from_iso(iso, Calendar::default())
    }

    /// Creates a year-month by resolving calendar fields. The day is
    /// ignored.
    pub fn from_partial(
        partial: PartialDate,
        calendar: Calendar,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        let iso = calendar.year_month_from_partial(&partial, overflow.unwrap_or_default())?;
        Self::try_from_iso(iso, calendar)
    }

    pub(crate) fn iso(&self) -> IsoDate {
        self.iso
    }

    /// The calendar of this year-month.
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

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

    fn to_partial(&self) -> TemporaResult<PartialDate> {
        Ok(PartialDate {
            year: Some(self.year()?),
            month_code: Some(self.month_code()?),
            ..Default::default()
        })
    }

    /// This year-month with the set fields of the partial replaced.
    /// The day is ignored.
    pub fn with(
        &self,
        partial: PartialDate,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        if partial.is_empty() {
            return Err(TemporaError::r#type()
                .with_message("a partial year-month must set at least one field"));
        }
        let mut merged = partial;
        if merged.year.is_none() && merged.era.is_none() {
            merged.year = Some(self.year()?);
        }
        if merged.month.is_none() && merged.month_code.is_none() {
            merged.month_code = Some(self.month_code()?);
        }
        Self::from_partial(merged, self.calendar, overflow)
    }

    /// Adds a duration. A negative duration anchors at the last day of
    /// the month so that moving backward lands in the expected month.
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

        let mut anchor_partial = self.to_partial()?;
        anchor_partial.day = Some(if duration.sign() == Sign::Negative {
            self.days_in_month()?
        } else {
            1
        });
        let anchor = self
            .calendar
            .date_from_partial(&anchor_partial, ArithmeticOverflow::Constrain)?;

        let date_duration = DateDuration {
            years: duration.years(),
            months: duration.months(),
            weeks: duration.weeks(),
            days,
        };
        let moved = self
            .calendar
            .date_add(anchor, &date_duration, overflow.unwrap_or_default())?;
        let projected = PartialDate {
            year: Some(self.calendar.year(moved)?),
            month_code: Some(self.calendar.month_code(moved)?),
            ..Default::default()
        };
        Self::from_partial(projected, self.calendar, overflow)
    }

    /// Subtracts a duration; the negation of [`Self::add`].
    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        self.add(&duration.negated(), overflow)
    }

    /// The duration from this year-month to `other`, in years and
    /// months.
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporaResult<Duration> {
        self.diff(DifferenceOperation::Until, other, settings)
    }

    /// The duration from `other` to this year-month.
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
                .with_message("year-months can only be differenced within one calendar"));
        }
        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            op,
            UnitGroup::Date,
            Unit::Year,
            Unit::Month,
        )?;
        if resolved.smallest_unit < Unit::Month || resolved.largest_unit < Unit::Month {
            return Err(TemporaError::range()
                .with_message("a year-month difference is limited to years and months"));
        }
        let record = crate::duration::diff_iso_datetime_with_rounding(
            IsoDateTime::new_unchecked(self.iso, IsoTime::default()),
            IsoDateTime::new_unchecked(other.iso, IsoTime::default()),
            self.calendar,
            resolved,
        )?;
        let result = Duration::from_normalized(record, resolved.largest_unit)?;
        Ok(match op {
            DifferenceOperation::Until => result,
            DifferenceOperation::Since => result.negated(),
        })
    }

    /// Orders two year-months by their ISO projection, ignoring
    /// calendars.
    pub fn compare_iso(&self, other: &Self) -> core::cmp::Ordering {
        self.iso.cmp(&other.iso)
    }

    /// Combines with a day of the month into a full date.
    pub fn to_plain_date(&self, day: u8) -> TemporaResult<PlainDate> {
        let mut partial = self.to_partial()?;
        partial.day = Some(day);
        PlainDate::from_partial(partial, self.calendar, None)
    }

    /// Renders with the given calendar display behavior. A non-ISO
    /// calendar shows the full reference date.
    #[must_use]
    pub fn to_ixdtf_string(&self, display_calendar: DisplayCalendar) -> String {
        use writeable::Writeable;
        FormattableYearMonth {
            date: FormattableDate(self.iso.year, self.iso.month, self.iso.day),
            calendar: FormattableCalendar {
                show: display_calendar,
                calendar: self.calendar.identifier(),
            },
        }
        .write_to_string()
        .into_owned()
    }
}

impl FromStr for PlainYearMonth {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = parsers::parse_year_month(s)?;
        let record = parsed.date.ok_or_else(|| {
            TemporaError::range().with_message("string does not contain a date")
        })?;
        let calendar = parsed
            .calendar
            .map(|id| Calendar::from_utf8(id.as_bytes()))
            .transpose()?
            .unwrap_or_default();
        let iso = IsoDate::new_unchecked(record.year, record.month, record.day);
        // Re-resolve so that a non-ISO string snaps to its calendar
        // month boundary.
        let partial = PartialDate {
            year: Some(calendar.year(iso)?),
            month_code: Some(calendar.month_code(iso)?),
            ..Default::default()
        };
        Self::from_partial(partial, calendar, None)
    }
}

impl core::fmt::Display for PlainYearMonth {
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
        let ym = PlainYearMonth::try_new_iso(2024, 2).unwrap();
        assert_eq!(ym.year().unwrap(), 2024);
        assert_eq!(ym.month().unwrap(), 2);
        assert_eq!(ym.days_in_month().unwrap(), 29);
        assert!(PlainYearMonth::try_new_iso(2024, 13).is_err());
    }

    #[test]
    fn add_months_and_years() {
        let ym = PlainYearMonth::try_new_iso(2023, 11).unwrap();
        let later = ym
            .add(&Duration::from_date_values(0, 3, 0, 0).unwrap(), None)
            .unwrap();
        assert_eq!(later.to_string(), "2024-02");
        let earlier = ym
            .subtract(&Duration::from_date_values(1, 0, 0, 0).unwrap(), None)
            .unwrap();
        assert_eq!(earlier.to_string(), "2022-11");
    }

    #[test]
    fn negative_day_spans_anchor_at_month_end() {
        // 30 days backward from the end of March 2024 lands in
        // February; from the first it would land in January.
        let ym = PlainYearMonth::try_new_iso(2024, 3).unwrap();
        let moved = ym
            .add(&Duration::from_date_values(0, 0, 0, -30).unwrap(), None)
            .unwrap();
        assert_eq!(moved.to_string(), "2024-03");
        let further = ym
            .add(&Duration::from_date_values(0, 0, 0, -32).unwrap(), None)
            .unwrap();
        assert_eq!(further.to_string(), "2024-02");
    }

    #[test]
    fn until_in_years_and_months() {
        let a = PlainYearMonth::try_new_iso(2022, 11).unwrap();
        let b = PlainYearMonth::try_new_iso(2024, 2).unwrap();
        let until = a.until(&b, DifferenceSettings::default()).unwrap();
        assert_eq!((until.years(), until.months()), (1, 3));
        let since = a.since(&b, DifferenceSettings::default()).unwrap();
        assert_eq!((since.years(), since.months()), (-1, -3));
        assert!(a
            .until(
                &b,
                DifferenceSettings {
                    smallest_unit: Some(Unit::Day),
                    ..Default::default()
                },
            )
            .is_err());
    }

    #[test]
    fn to_plain_date_attaches_a_day() {
        let ym = PlainYearMonth::try_new_iso(2024, 2).unwrap();
        assert_eq!(ym.to_plain_date(29).unwrap().to_string(), "2024-02-29");
        // Out-of-range days constrain.
        assert_eq!(ym.to_plain_date(31).unwrap().to_string(), "2024-02-29");
    }

    #[test]
    fn string_round_trip() {
        let ym = PlainYearMonth::from_str("2024-02").unwrap();
        assert_eq!(ym.to_string(), "2024-02");
        // A calendar annotation forces the full reference date.
        let gregorian = PlainYearMonth::from_str("2024-02-01[u-ca=gregory]").unwrap();
        assert_eq!(gregorian.to_string(), "2024-02-01[u-ca=gregory]");
        // A day-less form is reserved for the ISO calendar.
        assert!(PlainYearMonth::from_str("2024-02[u-ca=hebrew]").is_err());
    }
}
