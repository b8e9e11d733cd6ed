//! Calendar-aware date resolution and arithmetic.
//!
//! The ISO 8601 calendar is computed natively over the records in
//! [`crate::iso`]. Every other supported calendar delegates to
//! `icu_calendar`'s `AnyCalendar`, converting at the ISO boundary.

use core::str::FromStr;

use icu_calendar::{types::DateFields, AnyCalendar, AnyCalendarKind, Date as IcuDate, Iso};
use tinystr::{tinystr, TinyAsciiStr};

use crate::{
    duration::DateDuration,
    iso::{is_iso_leap_year, iso_days_in_month, iso_days_in_year, IsoDate},
    options::{ArithmeticOverflow, Unit},
    parsers,
    plain_date::PartialDate,
    TemporaError, TemporaResult,
};

/// The reference ISO year for month-day values.
const MONTH_DAY_REFERENCE_YEAR: i32 = 1972;

// A calendar year span guaranteed to cover every meaningful
// years/months offset; the instant limits cap dates well inside it.
const MAX_CALENDAR_MONTH_SPAN: i64 = 4_000_000;

// ==== MonthCode ====

/// A calendar month code: `M01` through `M13`, or a leap month
/// `M01L` through `M12L` where the calendar has them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthCode(pub(crate) TinyAsciiStr<4>);

impl MonthCode {
    /// Validates and creates a month code from UTF-8 bytes.
    pub fn try_from_utf8(code: &[u8]) -> TemporaResult<Self> {
        let (tens, ones, leap) = match *code {
            [b'M', tens, ones] => (tens, ones, false),
            [b'M', tens, ones, b'L'] => (tens, ones, true),
            _ => return Err(invalid_month_code()),
        };
        if !tens.is_ascii_digit() || !ones.is_ascii_digit() {
            return Err(invalid_month_code());
        }
        let number = (tens - b'0') * 10 + (ones - b'0');
        let max = if leap { 12 } else { 13 };
        if !(1..=max).contains(&number) {
            return Err(invalid_month_code());
        }
        let inner = TinyAsciiStr::try_from_utf8(code).map_err(|_| invalid_month_code())?;
        Ok(Self(inner))
    }

    /// Creates the standard code for a one-based month number.
    pub(crate) fn from_month_integer(month: u8) -> TemporaResult<Self> {
        Self::try_from_utf8(&[b'M', b'0' + month / 10, b'0' + month % 10])
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The numeric part of the code.
    #[must_use]
    pub fn to_month_integer(&self) -> u8 {
        let bytes = self.0.as_bytes();
        (bytes[1] - b'0') * 10 + (bytes[2] - b'0')
    }

    /// Whether this is a leap month code.
    #[must_use]
    pub fn is_leap_month(&self) -> bool {
        self.0.len() == 4
    }
}

impl FromStr for MonthCode {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_utf8(s.as_bytes())
    }
}

impl core::fmt::Display for MonthCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn invalid_month_code() -> TemporaError {
    TemporaError::range().with_message("invalid month code")
}

// ==== Calendar ====

/// A lightweight, copyable handle to one of the supported calendars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar(AnyCalendarKind);

impl Default for Calendar {
    fn default() -> Self {
        Self(AnyCalendarKind::Iso)
    }
}

impl Calendar {
    /// Creates a calendar for the given kind.
    #[must_use]
    pub const fn new(kind: AnyCalendarKind) -> Self {
        Self(kind)
    }

    /// Resolves an identifier, ASCII case-insensitively and honoring
    /// the canonical aliases.
    pub fn from_utf8(bytes: &[u8]) -> TemporaResult<Self> {
        let lowered = bytes.to_ascii_lowercase();
        let kind = match lowered.as_slice() {
            b"iso8601" => AnyCalendarKind::Iso,
            b"buddhist" => AnyCalendarKind::Buddhist,
            b"chinese" => AnyCalendarKind::Chinese,
            b"coptic" => AnyCalendarKind::Coptic,
            b"dangi" => AnyCalendarKind::Dangi,
            b"ethiopic" => AnyCalendarKind::Ethiopian,
            b"ethioaa" | b"ethiopic-amete-alem" => AnyCalendarKind::EthiopianAmeteAlem,
            b"gregory" => AnyCalendarKind::Gregorian,
            b"hebrew" => AnyCalendarKind::Hebrew,
            b"indian" => AnyCalendarKind::Indian,
            b"islamic" | b"islamicc" | b"islamic-civil" => {
                AnyCalendarKind::HijriTabularTypeIIFriday
            }
            b"islamic-tbla" => AnyCalendarKind::HijriTabularTypeIIThursday,
            b"islamic-umalqura" => AnyCalendarKind::HijriUmmAlQura,
            b"japanese" => AnyCalendarKind::Japanese,
            b"persian" => AnyCalendarKind::Persian,
            b"roc" => AnyCalendarKind::Roc,
            _ => {
                return Err(
                    TemporaError::range().with_message("not a supported calendar identifier")
                )
            }
        };
        Ok(Self(kind))
    }

    /// Returns the canonical identifier of this calendar.
    #[must_use]
    pub fn identifier(&self) -> &'static str {
        match self.0 {
            AnyCalendarKind::Buddhist => "buddhist",
            AnyCalendarKind::Chinese => "chinese",
            AnyCalendarKind::Coptic => "coptic",
            AnyCalendarKind::Dangi => "dangi",
            AnyCalendarKind::Ethiopian => "ethiopic",
            AnyCalendarKind::EthiopianAmeteAlem => "ethioaa",
            AnyCalendarKind::Gregorian => "gregory",
            AnyCalendarKind::Hebrew => "hebrew",
            AnyCalendarKind::HijriTabularTypeIIFriday => "islamic-civil",
            AnyCalendarKind::HijriTabularTypeIIThursday => "islamic-tbla",
            AnyCalendarKind::HijriUmmAlQura => "islamic-umalqura",
            AnyCalendarKind::Indian => "indian",
            AnyCalendarKind::Japanese => "japanese",
            AnyCalendarKind::Persian => "persian",
            AnyCalendarKind::Roc => "roc",
            _ => "iso8601",
        }
    }

    /// Whether this is the ISO 8601 calendar.
    #[inline]
    #[must_use]
    pub fn is_iso(&self) -> bool {
        self.0 == AnyCalendarKind::Iso
    }
}

impl FromStr for Calendar {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(calendar) = Self::from_utf8(s.as_bytes()) {
            return Ok(calendar);
        }
        // Fall back to the calendar annotation of any interchange
        // string that can carry one.
        let parsed = parsers::parse_date_time(s)
            .or_else(|_| parsers::parse_time(s))
            .or_else(|_| parsers::parse_year_month(s))
            .or_else(|_| parsers::parse_month_day(s))?;
        match parsed.calendar {
            Some(id) => Self::from_utf8(id.as_bytes()),
            None => Ok(Self::default()),
        }
    }
}

// ==== Field resolution ====

impl Calendar {
    /// `CalendarDateFromFields`
    pub(crate) fn date_from_partial(
        &self,
        partial: &PartialDate,
        overflow: ArithmeticOverflow,
    ) -> TemporaResult<IsoDate> {
        let day = partial
            .day
            .ok_or_else(|| TemporaError::r#type().with_message("required day field is missing"))?;

        if self.is_iso() {
            let year = self.resolve_iso_year(partial)?;
            let month = resolve_iso_month(partial)?;
            return IsoDate::new_with_overflow(year, i32::from(month), i32::from(day), overflow);
        }

        if let Some(code) = partial.month_code {
            self.validate_month_code(code)?;
        } else if partial.month.is_none() {
            return Err(TemporaError::r#type().with_message("required month field is missing"));
        }
        let era = self.resolve_era_pair(partial)?;
        if era.is_none() && partial.year.is_none() {
            return Err(TemporaError::r#type().with_message("required year field is missing"));
        }

        let date = resolve_fields_date(
            self.0,
            era.as_ref().map(|(era, year)| (era.as_bytes(), *year)),
            partial.year,
            partial.month_code,
            partial.month,
            day,
            overflow,
        )?;
        if let (Some(month), Some(_)) = (partial.month, partial.month_code) {
            if date.month().ordinal != month {
                return Err(TemporaError::range().with_message("month and monthCode disagree"));
            }
        }
        if let (Some((_, _)), Some(year)) = (era.as_ref(), partial.year) {
            if extended_year(&date) != year {
                return Err(TemporaError::range().with_message("era and year disagree"));
            }
        }
        Ok(iso_from_icu(&date))
    }

    /// `CalendarYearMonthFromFields`
    pub(crate) fn year_month_from_partial(
        &self,
        partial: &PartialDate,
        overflow: ArithmeticOverflow,
    ) -> TemporaResult<IsoDate> {
        if self.is_iso() {
            let year = self.resolve_iso_year(partial)?;
            let month = resolve_iso_month(partial)?;
            return IsoDate::new_with_overflow(year, i32::from(month), 1, overflow);
        }
        let with_day = PartialDate {
            day: Some(partial.day.unwrap_or(1)),
            ..*partial
        };
        self.date_from_partial(&with_day, overflow)
    }

    /// `CalendarMonthDayFromFields`
    ///
    /// The reference year is the latest ISO year at or before 1972 in
    /// which the month and day occur in the calendar.
    pub(crate) fn month_day_from_partial(
        &self,
        partial: &PartialDate,
        overflow: ArithmeticOverflow,
    ) -> TemporaResult<IsoDate> {
        let day = partial
            .day
            .ok_or_else(|| TemporaError::r#type().with_message("required day field is missing"))?;

        if self.is_iso() {
            let month = resolve_iso_month(partial)?;
            return IsoDate::new_with_overflow(
                MONTH_DAY_REFERENCE_YEAR,
                i32::from(month),
                i32::from(day),
                overflow,
            );
        }

        // Resolve the month code, validating the day against the
        // given year when one is present.
        let (code, day) = match (partial.month_code, partial.year, partial.month) {
            (Some(code), None, None) => {
                self.validate_month_code(code)?;
                (code, day)
            }
            (_, year, _) => {
                if year.is_none() && partial.era.is_none() {
                    return Err(TemporaError::r#type()
                        .with_message("month-day resolution requires a monthCode or a year"));
                }
                let date = self.date_from_partial(partial, overflow)?;
                let resolved = icu_date(self.0, date)?;
                (
                    MonthCode(resolved.month().to_input().code().0),
                    resolved.day_of_month().0,
                )
            }
        };
        self.month_day_reference_date(code, day, overflow)
    }

    fn month_day_reference_date(
        &self,
        code: MonthCode,
        day: u8,
        overflow: ArithmeticOverflow,
    ) -> TemporaResult<IsoDate> {
        let anchor = icu_date(
            self.0,
            IsoDate::new_unchecked(MONTH_DAY_REFERENCE_YEAR, 7, 1),
        )?;
        let base = extended_year(&anchor);
        let span = match self.0 {
            AnyCalendarKind::Chinese | AnyCalendarKind::Dangi => 60,
            _ => 30,
        };

        let mut requested = day;
        for attempt in 0..2 {
            for year in (base - span..=base + 1).rev() {
                let fields = date_fields(None, Some(year), Some(code.0.as_bytes()), None, requested);
                let Some(date) = try_fields_date(self.0, fields) else {
                    continue;
                };
                if date.month().to_input().code().0 != code.0 || date.day_of_month().0 != requested {
                    continue;
                }
                let iso = iso_from_icu(&date);
                if iso.year <= MONTH_DAY_REFERENCE_YEAR {
                    return Ok(iso);
                }
            }
            if attempt > 0 || overflow == ArithmeticOverflow::Reject {
                break;
            }
            // Constrain to the longest form the month takes at or
            // before the reference year.
            let mut max_day = 0u8;
            for year in base - span..=base + 1 {
                let fields = date_fields(None, Some(year), Some(code.0.as_bytes()), None, 1);
                let Some(probe) = try_fields_date(self.0, fields) else {
                    continue;
                };
                if probe.month().to_input().code().0 != code.0
                    || iso_from_icu(&probe).year > MONTH_DAY_REFERENCE_YEAR
                {
                    continue;
                }
                max_day = max_day.max(probe.days_in_month());
            }
            if max_day == 0 {
                break;
            }
            let clamped = day.min(max_day).max(1);
            if clamped == requested {
                break;
            }
            requested = clamped;
        }
        Err(TemporaError::range()
            .with_message("month and day do not occur in the calendar"))
    }

    fn resolve_iso_year(&self, partial: &PartialDate) -> TemporaResult<i32> {
        if partial.era.is_some() || partial.era_year.is_some() {
            return Err(TemporaError::range().with_message("the ISO 8601 calendar has no eras"));
        }
        partial
            .year
            .ok_or_else(|| TemporaError::r#type().with_message("required year field is missing"))
    }

    fn resolve_era_pair(
        &self,
        partial: &PartialDate,
    ) -> TemporaResult<Option<(TinyAsciiStr<19>, i32)>> {
        match (partial.era, partial.era_year) {
            (Some(era), Some(year)) => Ok(Some((self.normalize_era(era), year))),
            (None, None) => Ok(None),
            _ => Err(TemporaError::r#type()
                .with_message("era and eraYear must be provided together")),
        }
    }

    fn normalize_era(&self, era: TinyAsciiStr<19>) -> TinyAsciiStr<19> {
        if self.0 == AnyCalendarKind::Gregorian {
            if era == tinystr!(19, "ad") {
                return tinystr!(19, "ce");
            }
            if era == tinystr!(19, "bc") {
                return tinystr!(19, "bce");
            }
        }
        era
    }

    fn validate_month_code(&self, code: MonthCode) -> TemporaResult<()> {
        let number = code.to_month_integer();
        let valid = if code.is_leap_month() {
            match self.0 {
                AnyCalendarKind::Hebrew => number == 5,
                AnyCalendarKind::Chinese | AnyCalendarKind::Dangi => (1..=12).contains(&number),
                _ => false,
            }
        } else {
            let max = match self.0 {
                AnyCalendarKind::Coptic
                | AnyCalendarKind::Ethiopian
                | AnyCalendarKind::EthiopianAmeteAlem => 13,
                _ => 12,
            };
            (1..=max).contains(&number)
        };
        if !valid {
            return Err(TemporaError::range()
                .with_message("month code does not occur in the calendar"));
        }
        Ok(())
    }
}

fn resolve_iso_month(partial: &PartialDate) -> TemporaResult<u8> {
    match (partial.month, partial.month_code) {
        (_, Some(code)) => {
            if code.is_leap_month() || code.to_month_integer() > 12 {
                return Err(TemporaError::range()
                    .with_message("month code does not occur in the calendar"));
            }
            if partial.month.is_some_and(|month| month != code.to_month_integer()) {
                return Err(TemporaError::range().with_message("month and monthCode disagree"));
            }
            Ok(code.to_month_integer())
        }
        (Some(month), None) => Ok(month),
        (None, None) => {
            Err(TemporaError::r#type().with_message("required month field is missing"))
        }
    }
}

// ==== Date arithmetic ====

impl Calendar {
    /// `CalendarDateAdd`
    ///
    /// Years and months move in calendar space with the day regulated
    /// by the overflow behavior; weeks and days move in epoch-day
    /// space.
    pub(crate) fn date_add(
        &self,
        date: IsoDate,
        duration: &DateDuration,
        overflow: ArithmeticOverflow,
    ) -> TemporaResult<IsoDate> {
        if self.is_iso() {
            return date.add_date_duration(duration, overflow);
        }
        let intermediate = if duration.years != 0 || duration.months != 0 {
            self.add_years_months(date, duration.years, duration.months, overflow)?
        } else {
            date
        };
        let day_part = DateDuration {
            years: 0,
            months: 0,
            weeks: duration.weeks,
            days: duration.days,
        };
        intermediate.add_date_duration(&day_part, overflow)
    }

    /// `CalendarDateUntil`
    pub(crate) fn date_until(
        &self,
        one: IsoDate,
        two: IsoDate,
        largest_unit: Unit,
    ) -> TemporaResult<DateDuration> {
        if self.is_iso() {
            return one.diff(two, largest_unit);
        }
        // Weeks and days are calendar-independent.
        if largest_unit < Unit::Month {
            let days = two.to_epoch_days() - one.to_epoch_days();
            return if largest_unit == Unit::Week {
                DateDuration::new(0, 0, days / 7, days % 7)
            } else {
                DateDuration::new(0, 0, 0, days)
            };
        }

        let sign: i64 = match two.to_epoch_days() - one.to_epoch_days() {
            0 => return Ok(DateDuration::default()),
            diff if diff > 0 => 1,
            _ => -1,
        };

        let start = icu_date(self.0, one)?;
        let end = icu_date(self.0, two)?;
        let start_day = start.day_of_month().0;
        let end_year = extended_year(&end);
        let end_month = end.month().ordinal;
        let end_day = end.day_of_month().0;

        // A candidate count surpasses the target when moving the
        // start by it, with the start's raw day carried along, lands
        // past the end in calendar coordinates.
        let surpasses = |years: i64, months: i64| -> TemporaResult<bool> {
            let moved = self.add_years_months(one, years, months, ArithmeticOverflow::Constrain)?;
            let moved = icu_date(self.0, moved)?;
            Ok(tuple_surpasses(
                sign,
                (extended_year(&moved), moved.month().ordinal, start_day),
                (end_year, end_month, end_day),
            ))
        };

        let mut years = 0i64;
        if largest_unit == Unit::Year {
            years = i64::from(end_year) - i64::from(extended_year(&start));
            while years != 0 && surpasses(years, 0)? {
                years -= sign;
            }
        }
        let mut months = 0i64;
        if largest_unit == Unit::Month {
            // Every supported calendar year has at least twelve
            // months, so twelve-month strides cannot overshoot.
            while !surpasses(0, months + sign * 12)? {
                months += sign * 12;
            }
        }
        while !surpasses(years, months + sign)? {
            months += sign;
        }

        let intermediate =
            self.add_years_months(one, years, months, ArithmeticOverflow::Constrain)?;
        let days = two.to_epoch_days() - intermediate.to_epoch_days();
        DateDuration::new(years, months, 0, days)
    }

    fn add_years_months(
        &self,
        date: IsoDate,
        years: i64,
        months: i64,
        overflow: ArithmeticOverflow,
    ) -> TemporaResult<IsoDate> {
        if months.abs() > MAX_CALENDAR_MONTH_SPAN {
            return Err(TemporaError::range()
                .with_message("date is outside the supported range"));
        }
        let start = icu_date(self.0, date)?;
        let original_day = start.day_of_month().0;
        let mut year = extended_year(&start);
        let mut ordinal = start.month().ordinal;

        if years != 0 {
            let years = i32::try_from(years).map_err(|_| {
                TemporaError::range().with_message("date is outside the supported range")
            })?;
            let target = year.checked_add(years).ok_or_else(|| {
                TemporaError::range().with_message("date is outside the supported range")
            })?;
            let code = MonthCode(start.month().to_input().code().0);
            let moved = resolve_fields_date(
                self.0,
                None,
                Some(target),
                Some(code),
                None,
                original_day,
                overflow,
            )?;
            year = extended_year(&moved);
            ordinal = moved.month().ordinal;
            if months == 0 {
                return Ok(iso_from_icu(&moved));
            }
        }

        // Wrap the ordinal month through year boundaries, honest
        // about leap-month years.
        let mut total = i64::from(ordinal) - 1 + months;
        while total < 0 {
            year -= 1;
            total += i64::from(self.months_in_calendar_year(year)?);
        }
        loop {
            let in_year = i64::from(self.months_in_calendar_year(year)?);
            if total < in_year {
                break;
            }
            total -= in_year;
            year += 1;
        }
        let moved = resolve_fields_date(
            self.0,
            None,
            Some(year),
            None,
            Some(total as u8 + 1),
            original_day,
            overflow,
        )?;
        Ok(iso_from_icu(&moved))
    }

    fn months_in_calendar_year(&self, year: i32) -> TemporaResult<u8> {
        let fields = date_fields(None, Some(year), None, Some(1), 1);
        let date = try_fields_date(self.0, fields).ok_or_else(|| {
            TemporaError::range().with_message("date is outside the supported range")
        })?;
        Ok(date.months_in_year())
    }
}

fn tuple_surpasses(sign: i64, moved: (i32, u8, u8), target: (i32, u8, u8)) -> bool {
    let ordering = moved.cmp(&target);
    sign * (ordering as i64) > 0
}

// ==== Derived getters ====

impl Calendar {
    /// `CalendarEra`
    pub(crate) fn era(&self, iso: IsoDate) -> TemporaResult<Option<TinyAsciiStr<16>>> {
        if self.is_iso() {
            return Ok(None);
        }
        let date = icu_date(self.0, iso)?;
        Ok(date.year().era().map(|era| era.era))
    }

    /// `CalendarEraYear`
    pub(crate) fn era_year(&self, iso: IsoDate) -> TemporaResult<Option<i32>> {
        if self.is_iso() {
            return Ok(None);
        }
        let date = icu_date(self.0, iso)?;
        Ok(date.year().era().map(|era| era.year))
    }

    /// `CalendarYear`
    pub(crate) fn year(&self, iso: IsoDate) -> TemporaResult<i32> {
        if self.is_iso() {
            return Ok(iso.year);
        }
        let date = icu_date(self.0, iso)?;
        let info = date.year();
        Ok(if info.era().is_some() {
            info.extended_year()
        } else {
            info.era_year_or_related_iso()
        })
    }

    /// `CalendarMonth`
    pub(crate) fn month(&self, iso: IsoDate) -> TemporaResult<u8> {
        if self.is_iso() {
            return Ok(iso.month);
        }
        Ok(icu_date(self.0, iso)?.month().ordinal)
    }

    /// `CalendarMonthCode`
    pub(crate) fn month_code(&self, iso: IsoDate) -> TemporaResult<MonthCode> {
        if self.is_iso() {
            return MonthCode::from_month_integer(iso.month);
        }
        Ok(MonthCode(icu_date(self.0, iso)?.month().to_input().code().0))
    }

    /// `CalendarDay`
    pub(crate) fn day(&self, iso: IsoDate) -> TemporaResult<u8> {
        if self.is_iso() {
            return Ok(iso.day);
        }
        Ok(icu_date(self.0, iso)?.day_of_month().0)
    }

    /// `CalendarDayOfYear`
    pub(crate) fn day_of_year(&self, iso: IsoDate) -> TemporaResult<u16> {
        if self.is_iso() {
            return Ok(iso.day_of_year());
        }
        Ok(icu_date(self.0, iso)?.day_of_year().0)
    }

    /// `CalendarDaysInMonth`
    pub(crate) fn days_in_month(&self, iso: IsoDate) -> TemporaResult<u8> {
        if self.is_iso() {
            return Ok(iso_days_in_month(iso.year, iso.month));
        }
        Ok(icu_date(self.0, iso)?.days_in_month())
    }

    /// `CalendarDaysInYear`
    pub(crate) fn days_in_year(&self, iso: IsoDate) -> TemporaResult<u16> {
        if self.is_iso() {
            return Ok(iso_days_in_year(iso.year));
        }
        Ok(icu_date(self.0, iso)?.days_in_year())
    }

    /// `CalendarMonthsInYear`
    pub(crate) fn months_in_year(&self, iso: IsoDate) -> TemporaResult<u8> {
        if self.is_iso() {
            return Ok(12);
        }
        Ok(icu_date(self.0, iso)?.months_in_year())
    }

    /// `CalendarInLeapYear`
    pub(crate) fn in_leap_year(&self, iso: IsoDate) -> TemporaResult<bool> {
        if self.is_iso() {
            return Ok(is_iso_leap_year(iso.year));
        }
        Ok(icu_date(self.0, iso)?.is_in_leap_year())
    }
}

// ==== icu_calendar plumbing ====

fn icu_date(kind: AnyCalendarKind, iso: IsoDate) -> TemporaResult<IcuDate<AnyCalendar>> {
    let date = IcuDate::try_new_iso(iso.year, iso.month, iso.day).map_err(|_| {
        TemporaError::range().with_message("date is outside the supported range")
    })?;
    Ok(date.to_any().to_calendar(AnyCalendar::new(kind)))
}

fn iso_from_icu(date: &IcuDate<AnyCalendar>) -> IsoDate {
    let iso = date.to_calendar(Iso);
    IsoDate::new_unchecked(
        iso.year().extended_year(),
        iso.month().ordinal,
        iso.day_of_month().0,
    )
}

fn extended_year(date: &IcuDate<AnyCalendar>) -> i32 {
    date.year().extended_year()
}

fn date_fields<'a>(
    era: Option<(&'a [u8], i32)>,
    extended_year: Option<i32>,
    month_code: Option<&'a [u8]>,
    ordinal_month: Option<u8>,
    day: u8,
) -> DateFields<'a> {
    let mut fields = DateFields::default();
    if let Some((era, year)) = era {
        fields.era = Some(era);
        fields.era_year = Some(year);
    } else {
        fields.extended_year = extended_year;
    }
    fields.month_code = month_code;
    fields.ordinal_month = ordinal_month;
    fields.day = Some(day);
    fields
}

fn try_fields_date(
    kind: AnyCalendarKind,
    fields: DateFields<'_>,
) -> Option<IcuDate<AnyCalendar>> {
    IcuDate::try_from_fields(fields, Default::default(), AnyCalendar::new(kind)).ok()
}

/// Resolves calendar fields to a date, regulating by the overflow
/// behavior: clamping the day into the month, substituting an absent
/// leap month with its overlapping month, and clamping an ordinal
/// month into the year.
fn resolve_fields_date(
    kind: AnyCalendarKind,
    era: Option<(&[u8], i32)>,
    extended_year: Option<i32>,
    month_code: Option<MonthCode>,
    ordinal_month: Option<u8>,
    day: u8,
    overflow: ArithmeticOverflow,
) -> TemporaResult<IcuDate<AnyCalendar>> {
    let code = month_code.map(|code| code.0);
    let code_bytes = code.as_ref().map(|c| c.as_utf8());

    if let Some(date) = try_fields_date(
        kind,
        date_fields(era, extended_year, code_bytes, ordinal_month, day),
    ) {
        if overflow == ArithmeticOverflow::Reject {
            let day_matches = date.day_of_month().0 == day;
            let code_matches =
                month_code.is_none_or(|code| date.month().to_input().code().0 == code.0);
            if !day_matches || !code_matches {
                return Err(no_such_date());
            }
        }
        return Ok(date);
    }
    if overflow == ArithmeticOverflow::Reject {
        return Err(no_such_date());
    }

    // Clamp the day into the month.
    if let Some(probe) = try_fields_date(
        kind,
        date_fields(era, extended_year, code_bytes, ordinal_month, 1),
    ) {
        let clamped = day.min(probe.days_in_month()).max(1);
        return try_fields_date(
            kind,
            date_fields(era, extended_year, code_bytes, ordinal_month, clamped),
        )
        .ok_or_else(no_such_date);
    }
    // A leap month absent in the target year constrains to the month
    // it overlaps.
    if let Some(code) = month_code.filter(MonthCode::is_leap_month) {
        let fallback = if kind == AnyCalendarKind::Hebrew && code.0 == tinystr!(4, "M05L") {
            MonthCode(tinystr!(4, "M06"))
        } else {
            MonthCode(
                TinyAsciiStr::try_from_utf8(&code.0.as_bytes()[..3])
                    .map_err(|_| no_such_date())?,
            )
        };
        return resolve_fields_date(kind, era, extended_year, Some(fallback), None, day, overflow);
    }
    // Clamp an ordinal month past the end of the year.
    if let (None, Some(ordinal)) = (month_code, ordinal_month) {
        if let Some(probe) =
            try_fields_date(kind, date_fields(era, extended_year, None, Some(1), 1))
        {
            let clamped = ordinal.min(probe.months_in_year());
            if clamped != ordinal {
                return resolve_fields_date(
                    kind,
                    era,
                    extended_year,
                    None,
                    Some(clamped),
                    day,
                    overflow,
                );
            }
        }
    }
    Err(no_such_date())
}

fn no_such_date() -> TemporaError {
    TemporaError::range().with_message("date does not exist in the calendar")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Unit;

    fn iso(year: i32, month: u8, day: u8) -> IsoDate {
        IsoDate::new_unchecked(year, month, day)
    }

    #[test]
    fn identifier_canonicalization() {
        assert_eq!(Calendar::from_utf8(b"iSo8601").unwrap(), Calendar::default());
        assert_eq!(
            Calendar::from_utf8(b"islamicc").unwrap().identifier(),
            "islamic-civil"
        );
        assert_eq!(
            Calendar::from_utf8(b"ETHIOPIC-AMETE-ALEM").unwrap().identifier(),
            "ethioaa"
        );
        assert!(Calendar::from_utf8(b"gregorian").is_err());
        assert!(Calendar::from_utf8(b"").is_err());
    }

    #[test]
    fn calendar_from_interchange_string() {
        let calendar = Calendar::from_str("2024-01-15[u-ca=gregory]").unwrap();
        assert_eq!(calendar.identifier(), "gregory");
        let calendar = Calendar::from_str("2024-01-15").unwrap();
        assert_eq!(calendar.identifier(), "iso8601");
        assert!(Calendar::from_str("not a calendar").is_err());
    }

    #[test]
    fn month_code_validation() {
        assert_eq!(MonthCode::from_str("M01").unwrap().to_month_integer(), 1);
        assert_eq!(MonthCode::from_str("M13").unwrap().to_month_integer(), 13);
        assert!(MonthCode::from_str("M05L").unwrap().is_leap_month());
        assert!(MonthCode::from_str("M00").is_err());
        assert!(MonthCode::from_str("M14").is_err());
        assert!(MonthCode::from_str("M13L").is_err());
        assert!(MonthCode::from_str("5").is_err());
    }

    #[test]
    fn iso_partial_resolution() {
        let calendar = Calendar::default();
        let partial = PartialDate {
            year: Some(2024),
            month: Some(2),
            day: Some(40),
            ..Default::default()
        };
        let date = calendar
            .date_from_partial(&partial, ArithmeticOverflow::Constrain)
            .unwrap();
        assert_eq!(date, iso(2024, 2, 29));
        assert!(calendar
            .date_from_partial(&partial, ArithmeticOverflow::Reject)
            .is_err());

        // month and monthCode must agree.
        let partial = PartialDate {
            year: Some(2024),
            month: Some(3),
            month_code: Some(MonthCode::from_str("M02").unwrap()),
            day: Some(1),
            ..Default::default()
        };
        assert!(calendar
            .date_from_partial(&partial, ArithmeticOverflow::Constrain)
            .is_err());
    }

    #[test]
    fn iso_month_day_reference_year() {
        let calendar = Calendar::default();
        let partial = PartialDate {
            month: Some(2),
            day: Some(29),
            ..Default::default()
        };
        let date = calendar
            .month_day_from_partial(&partial, ArithmeticOverflow::Reject)
            .unwrap();
        assert_eq!(date, iso(1972, 2, 29));
    }

    #[test]
    fn iso_add_clamps_into_short_month() {
        let calendar = Calendar::default();
        let one_month = DateDuration::new(0, 1, 0, 0).unwrap();
        let result = calendar
            .date_add(iso(2024, 1, 31), &one_month, ArithmeticOverflow::Constrain)
            .unwrap();
        assert_eq!(result, iso(2024, 2, 29));
        assert!(calendar
            .date_add(iso(2024, 1, 31), &one_month, ArithmeticOverflow::Reject)
            .is_err());
    }

    #[test]
    fn iso_date_until_delegates() {
        let calendar = Calendar::default();
        let result = calendar
            .date_until(iso(2000, 5, 2), iso(2001, 6, 1), Unit::Year)
            .unwrap();
        assert_eq!((result.years, result.months, result.days), (1, 0, 30));
    }

    #[test]
    fn gregory_fields_match_iso_projection() {
        let calendar = Calendar::from_utf8(b"gregory").unwrap();
        let date = iso(2024, 5, 2);
        assert_eq!(calendar.year(date).unwrap(), 2024);
        assert_eq!(calendar.month(date).unwrap(), 5);
        assert_eq!(calendar.day(date).unwrap(), 2);
        assert_eq!(calendar.era(date).unwrap().unwrap().as_str(), "ce");
        assert_eq!(calendar.era_year(date).unwrap(), Some(2024));
        assert_eq!(calendar.months_in_year(date).unwrap(), 12);
    }

    #[test]
    fn gregory_arithmetic_matches_iso() {
        let gregory = Calendar::from_utf8(b"gregory").unwrap();
        let duration = DateDuration::new(1, 2, 0, 3).unwrap();
        let from_gregory = gregory
            .date_add(iso(2020, 3, 14), &duration, ArithmeticOverflow::Constrain)
            .unwrap();
        let from_iso = Calendar::default()
            .date_add(iso(2020, 3, 14), &duration, ArithmeticOverflow::Constrain)
            .unwrap();
        assert_eq!(from_gregory, from_iso);

        let until = gregory
            .date_until(iso(2020, 3, 14), from_gregory, Unit::Year)
            .unwrap();
        assert_eq!((until.years, until.months, until.days), (1, 2, 3));
    }

    #[test]
    fn hebrew_leap_month_constrains() {
        let hebrew = Calendar::from_utf8(b"hebrew").unwrap();
        // 5784 is a Hebrew leap year, 5785 is not.
        let partial = PartialDate {
            year: Some(5784),
            month_code: Some(MonthCode::from_str("M05L").unwrap()),
            day: Some(1),
            ..Default::default()
        };
        let in_leap_year = hebrew
            .date_from_partial(&partial, ArithmeticOverflow::Reject)
            .unwrap();
        assert!(hebrew.in_leap_year(in_leap_year).unwrap());

        let partial = PartialDate {
            year: Some(5785),
            ..partial
        };
        assert!(hebrew
            .date_from_partial(&partial, ArithmeticOverflow::Reject)
            .is_err());
        let constrained = hebrew
            .date_from_partial(&partial, ArithmeticOverflow::Constrain)
            .unwrap();
        assert_eq!(
            hebrew.month_code(constrained).unwrap().as_str(),
            "M06"
        );
    }
}
