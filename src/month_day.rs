//! The [`PlainMonthDay`] calendar month-day type.

use alloc::string::String;
use core::str::FromStr;

use crate::{
    calendar::{Calendar, MonthCode},
    iso::IsoDate,
    options::{ArithmeticOverflow, DisplayCalendar},
    parsers::{self, FormattableCalendar, FormattableDate, FormattableMonthDay},
    plain_date::{PartialDate, PlainDate},
    TemporaError, TemporaResult,
};

/// A calendar month and day with no year attached, such as a birthday
/// or holiday.
///
/// The backing ISO date holds a reference year: the latest ISO year at
/// or before 1972 in which the month-day occurs in the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainMonthDay {
    iso: IsoDate,
    calendar: Calendar,
}

impl PlainMonthDay {
    pub(crate) const fn new_unchecked(iso: IsoDate, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    /// Creates an ISO 8601 calendar month-day, regulating the day per
    /// the overflow behavior.
    pub fn try_new_iso(month: u8, day: u8) -> TemporaResult<Self> {
        Self::from_partial(
            PartialDate {
                month: Some(month),
                day: Some(day),
                ..Default::default()
            },
            Calendar::default(),
            Some(ArithmeticOverflow::Reject),
        )
    }

    /// Creates a month-day by resolving calendar fields.
    pub fn from_partial(
        partial: PartialDate,
        calendar: Calendar,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        let iso = calendar.month_day_from_partial(&partial, overflow.unwrap_or_default())?;
        Ok(Self::new_unchecked(iso, calendar))
    }

    pub(crate) fn iso(&self) -> IsoDate {
        self.iso
    }

    /// The calendar of this month-day.
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// The month code.
    pub fn month_code(&self) -> TemporaResult<MonthCode> {
        self.calendar.month_code(self.iso)
    }

    /// The day of the month.
    pub fn day(&self) -> TemporaResult<u8> {
        self.calendar.day(self.iso)
    }

    /// This month-day with the set fields of the partial replaced. The
    /// year only steers resolution; the result remains year-less.
    pub fn with(
        &self,
        partial: PartialDate,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        if partial.is_empty() {
            return Err(TemporaError::r#type()
                .with_message("a partial month-day must set at least one field"));
        }
        let mut merged = partial;
        if merged.month.is_none() && merged.month_code.is_none() {
            merged.month_code = Some(self.month_code()?);
        }
        if merged.day.is_none() {
            merged.day = Some(self.day()?);
        }
        Self::from_partial(merged, self.calendar, overflow)
    }

    /// Combines with a calendar year into a full date. An impossible
    /// combination constrains to the nearest day in that year.
    pub fn to_plain_date(&self, year: i32) -> TemporaResult<PlainDate> {
        let partial = PartialDate {
            year: Some(year),
            month_code: Some(self.month_code()?),
            day: Some(self.day()?),
            ..Default::default()
        };
        PlainDate::from_partial(partial, self.calendar, None)
    }

    /// Renders with the given calendar display behavior. A non-ISO
    /// calendar shows the full reference date.
    #[must_use]
    pub fn to_ixdtf_string(&self, display_calendar: DisplayCalendar) -> String {
        use writeable::Writeable;
        FormattableMonthDay {
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

impl FromStr for PlainMonthDay {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = parsers::parse_month_day(s)?;
        let record = parsed.date.ok_or_else(|| {
            TemporaError::range().with_message("string does not contain a date")
        })?;
        let calendar = parsed
            .calendar
            .map(|id| Calendar::from_utf8(id.as_bytes()))
            .transpose()?
            .unwrap_or_default();
        let iso = IsoDate::new_unchecked(record.year, record.month, record.day);
        // Re-resolve so that the reference year is canonical for the
        // calendar.
        let partial = PartialDate {
            month_code: Some(calendar.month_code(iso)?),
            day: Some(calendar.day(iso)?),
            ..Default::default()
        };
        Self::from_partial(partial, calendar, None)
    }
}

impl core::fmt::Display for PlainMonthDay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_ixdtf_string(DisplayCalendar::Auto))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn reference_year_is_a_leap_year() {
        let md = PlainMonthDay::try_new_iso(2, 29).unwrap();
        assert_eq!(md.to_string(), "02-29");
        assert_eq!(md.iso().year, 1972);
        assert!(PlainMonthDay::try_new_iso(2, 30).is_err());
    }

    #[test]
    fn to_plain_date_constrains() {
        let md = PlainMonthDay::try_new_iso(2, 29).unwrap();
        assert_eq!(md.to_plain_date(2024).unwrap().to_string(), "2024-02-29");
        // No February 29 in 2023; the day constrains.
        assert_eq!(md.to_plain_date(2023).unwrap().to_string(), "2023-02-28");
    }

    #[test]
    fn with_replaces_fields() {
        let md = PlainMonthDay::try_new_iso(1, 15).unwrap();
        let replaced = md
            .with(
                PartialDate {
                    month: Some(3),
                    ..Default::default()
                },
                None,
            )
            .unwrap();
        assert_eq!(replaced.to_string(), "03-15");
        assert!(md.with(PartialDate::default(), None).is_err());
    }

    #[test]
    fn string_round_trip() {
        let md = PlainMonthDay::from_str("02-29").unwrap();
        assert_eq!(md.to_string(), "02-29");
        assert_eq!(PlainMonthDay::from_str("0229").unwrap(), md);
        // A calendar annotation forces the full reference date.
        let gregorian = PlainMonthDay::from_str("1972-02-29[u-ca=gregory]").unwrap();
        assert_eq!(gregorian.to_string(), "1972-02-29[u-ca=gregory]");
        // A year-less form is reserved for the ISO calendar.
        assert!(PlainMonthDay::from_str("02-29[u-ca=hebrew]").is_err());
    }
}
