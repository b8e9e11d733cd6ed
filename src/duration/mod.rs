//! The duration types and their arithmetic.

use crate::{
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{
        ArithmeticOverflow, Precision, ResolvedRoundingOptions, RoundingIncrement, RoundingMode,
        RoundingOptions, ToStringRoundingOptions, Unit,
    },
    parsers::{self, FormattableDuration},
    plain_date::PlainDate,
    provider::TimeZoneProvider,
    rounding::IncrementRounder,
    zoned_date_time::ZonedDateTime,
    Sign, TemporaError, TemporaResult, TemporaUnwrap, NS_PER_DAY,
};

use alloc::string::String;
use core::{cmp::Ordering, fmt, num::NonZeroU128, str::FromStr};
use writeable::Writeable;

pub(crate) mod normalized;
#[cfg(test)]
mod tests;

pub(crate) use normalized::{
    diff_iso_datetime, diff_iso_datetime_with_rounding, NormalizedDurationRecord,
    NormalizedTimeDuration, RoundAnchor,
};

const NS_PER_HOUR: i128 = 3_600_000_000_000;
const NS_PER_MINUTE: i128 = 60_000_000_000;
const NS_PER_SECOND: i128 = 1_000_000_000;
const NS_PER_MILLISECOND: i128 = 1_000_000;
const NS_PER_MICROSECOND: i128 = 1_000;

const TWO_POW_32: i64 = 1 << 32;

// ==== DateDuration ====

/// The calendar portion of a duration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateDuration {
    /// The number of years.
    pub years: i64,
    /// The number of months.
    pub months: i64,
    /// The number of weeks.
    pub weeks: i64,
    /// The number of days.
    pub days: i64,
}

impl DateDuration {
    /// Creates a validated date duration.
    pub fn new(years: i64, months: i64, weeks: i64, days: i64) -> TemporaResult<Self> {
        validate_duration_fields(&[years, months, weeks, days])?;
        Ok(Self {
            years,
            months,
            weeks,
            days,
        })
    }

    pub(crate) const fn from_years(years: i64) -> Self {
        Self {
            years,
            months: 0,
            weeks: 0,
            days: 0,
        }
    }

    pub(crate) const fn from_days(days: i64) -> Self {
        Self {
            years: 0,
            months: 0,
            weeks: 0,
            days,
        }
    }

    /// The sign of the first nonzero field.
    pub fn sign(&self) -> Sign {
        for field in [self.years, self.months, self.weeks, self.days] {
            if field != 0 {
                return Sign::from_i64(field);
            }
        }
        Sign::Zero
    }

    pub(crate) fn negated(&self) -> Self {
        Self {
            years: -self.years,
            months: -self.months,
            weeks: -self.weeks,
            days: -self.days,
        }
    }
}

// ==== TimeDuration ====

/// The clock portion of a duration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimeDuration {
    /// The number of hours.
    pub hours: i64,
    /// The number of minutes.
    pub minutes: i64,
    /// The number of seconds.
    pub seconds: i64,
    /// The number of milliseconds.
    pub milliseconds: i64,
    /// The number of microseconds.
    pub microseconds: i64,
    /// The number of nanoseconds.
    pub nanoseconds: i64,
}

impl TimeDuration {
    pub(crate) fn to_normalized(self) -> TemporaResult<NormalizedTimeDuration> {
        NormalizedTimeDuration::from_time_fields(
            self.hours,
            self.minutes,
            self.seconds,
            self.milliseconds,
            self.microseconds,
            self.nanoseconds,
        )
    }
}

// ==== Duration ====

/// A signed span of calendar and clock time.
///
/// Fields are kept as provided rather than balanced: two hours is a
/// distinct duration from one hundred twenty minutes. All nonzero
/// fields must share a sign.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    date: DateDuration,
    time: TimeDuration,
}

/// A duration where every field is optional.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PartialDuration {
    /// The number of years.
    pub years: Option<i64>,
    /// The number of months.
    pub months: Option<i64>,
    /// The number of weeks.
    pub weeks: Option<i64>,
    /// The number of days.
    pub days: Option<i64>,
    /// The number of hours.
    pub hours: Option<i64>,
    /// The number of minutes.
    pub minutes: Option<i64>,
    /// The number of seconds.
    pub seconds: Option<i64>,
    /// The number of milliseconds.
    pub milliseconds: Option<i64>,
    /// The number of microseconds.
    pub microseconds: Option<i64>,
    /// The number of nanoseconds.
    pub nanoseconds: Option<i64>,
}

impl PartialDuration {
    /// Whether no field has been set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The reference point calendar-unit arithmetic is carried out
/// against.
#[derive(Debug, Clone)]
pub enum RelativeTo {
    /// A civil date; days are 24 hours long.
    PlainDate(PlainDate),
    /// A zoned timestamp; day lengths follow the zone.
    ZonedDateTime(ZonedDateTime),
}

impl Duration {
    /// Creates a duration, validating sign agreement and range.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        years: i64,
        months: i64,
        weeks: i64,
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
        microseconds: i64,
        nanoseconds: i64,
    ) -> TemporaResult<Self> {
        let result = Self {
            date: DateDuration {
                years,
                months,
                weeks,
                days,
            },
            time: TimeDuration {
                hours,
                minutes,
                seconds,
                milliseconds,
                microseconds,
                nanoseconds,
            },
        };
        result.validate()?;
        Ok(result)
    }

    /// Creates a duration from its calendar fields alone.
    pub fn from_date_values(years: i64, months: i64, weeks: i64, days: i64) -> TemporaResult<Self> {
        Self::new(years, months, weeks, days, 0, 0, 0, 0, 0, 0)
    }

    /// Creates a duration from a partial, treating unset fields as
    /// zero. An entirely empty partial is rejected.
    pub fn from_partial_duration(partial: PartialDuration) -> TemporaResult<Self> {
        if partial.is_empty() {
            return Err(TemporaError::r#type()
                .with_message("a partial duration must set at least one field"));
        }
        Self::new(
            partial.years.unwrap_or(0),
            partial.months.unwrap_or(0),
            partial.weeks.unwrap_or(0),
            partial.days.unwrap_or(0),
            partial.hours.unwrap_or(0),
            partial.minutes.unwrap_or(0),
            partial.seconds.unwrap_or(0),
            partial.milliseconds.unwrap_or(0),
            partial.microseconds.unwrap_or(0),
            partial.nanoseconds.unwrap_or(0),
        )
    }

    pub(crate) fn from_parts(date: DateDuration, time: TimeDuration) -> TemporaResult<Self> {
        let result = Self { date, time };
        result.validate()?;
        Ok(result)
    }

    fn validate(&self) -> TemporaResult<()> {
        validate_duration_fields(&[
            self.date.years,
            self.date.months,
            self.date.weeks,
            self.date.days,
            self.time.hours,
            self.time.minutes,
            self.time.seconds,
            self.time.milliseconds,
            self.time.microseconds,
            self.time.nanoseconds,
        ])?;
        // Bound the total of days and time together.
        self.time.to_normalized()?.add_days(self.date.days)?;
        Ok(())
    }

    // field accessors

    /// The years field.
    pub fn years(&self) -> i64 {
        self.date.years
    }

    /// The months field.
    pub fn months(&self) -> i64 {
        self.date.months
    }

    /// The weeks field.
    pub fn weeks(&self) -> i64 {
        self.date.weeks
    }

    /// The days field.
    pub fn days(&self) -> i64 {
        self.date.days
    }

    /// The hours field.
    pub fn hours(&self) -> i64 {
        self.time.hours
    }

    /// The minutes field.
    pub fn minutes(&self) -> i64 {
        self.time.minutes
    }

    /// The seconds field.
    pub fn seconds(&self) -> i64 {
        self.time.seconds
    }

    /// The milliseconds field.
    pub fn milliseconds(&self) -> i64 {
        self.time.milliseconds
    }

    /// The microseconds field.
    pub fn microseconds(&self) -> i64 {
        self.time.microseconds
    }

    /// The nanoseconds field.
    pub fn nanoseconds(&self) -> i64 {
        self.time.nanoseconds
    }

    /// The calendar portion.
    pub fn date(&self) -> DateDuration {
        self.date
    }

    /// The clock portion.
    pub fn time(&self) -> TimeDuration {
        self.time
    }

    /// The sign of the first nonzero field.
    pub fn sign(&self) -> Sign {
        let date_sign = self.date.sign();
        if date_sign != Sign::Zero {
            return date_sign;
        }
        for field in [
            self.time.hours,
            self.time.minutes,
            self.time.seconds,
            self.time.milliseconds,
            self.time.microseconds,
            self.time.nanoseconds,
        ] {
            if field != 0 {
                return Sign::from_i64(field);
            }
        }
        Sign::Zero
    }

    /// Whether every field is zero.
    pub fn is_zero(&self) -> bool {
        self.sign() == Sign::Zero
    }

    /// This duration with every field negated.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            date: self.date.negated(),
            time: TimeDuration {
                hours: -self.time.hours,
                minutes: -self.time.minutes,
                seconds: -self.time.seconds,
                milliseconds: -self.time.milliseconds,
                microseconds: -self.time.microseconds,
                nanoseconds: -self.time.nanoseconds,
            },
        }
    }

    /// This duration with every field made non-negative.
    #[must_use]
    pub fn abs(&self) -> Self {
        if self.sign() == Sign::Negative {
            self.negated()
        } else {
            *self
        }
    }

    /// The largest unit with a nonzero field, or nanosecond for the
    /// zero duration.
    pub fn default_largest_unit(&self) -> Unit {
        let fields = [
            (self.date.years, Unit::Year),
            (self.date.months, Unit::Month),
            (self.date.weeks, Unit::Week),
            (self.date.days, Unit::Day),
            (self.time.hours, Unit::Hour),
            (self.time.minutes, Unit::Minute),
            (self.time.seconds, Unit::Second),
            (self.time.milliseconds, Unit::Millisecond),
            (self.time.microseconds, Unit::Microsecond),
        ];
        for (value, unit) in fields {
            if value != 0 {
                return unit;
            }
        }
        Unit::Nanosecond
    }

    fn has_calendar_fields(&self) -> bool {
        self.date.years != 0 || self.date.months != 0 || self.date.weeks != 0
    }

    /// Splits into the calendar portion and the normalized clock
    /// portion; days stay on the calendar side.
    pub(crate) fn to_normalized(&self) -> TemporaResult<NormalizedDurationRecord> {
        NormalizedDurationRecord::new(self.date, self.time.to_normalized()?)
    }

    /// Rebuilds a duration from a normalized record, balancing the
    /// clock portion up to `largest_unit` (capped at hours).
    pub(crate) fn from_normalized(
        record: NormalizedDurationRecord,
        largest_unit: Unit,
    ) -> TemporaResult<Self> {
        let time = balance_time_fields(record.normalized_time().0, largest_unit)?;
        Self::from_parts(record.date(), time)
    }

    // ==== Arithmetic ====

    /// Adds two durations field-wise. Calendar units have no fixed
    /// length, so either operand carrying years, months, or weeks is a
    /// range error.
    pub fn add(&self, other: &Self) -> TemporaResult<Self> {
        if self.has_calendar_fields() || other.has_calendar_fields() {
            return Err(TemporaError::range()
                .with_message("durations with calendar units cannot be added directly"));
        }
        let largest = self
            .default_largest_unit()
            .max(other.default_largest_unit());
        let sum = self
            .time
            .to_normalized()?
            .add_days(self.date.days)?
            .checked_add(other.time.to_normalized()?.add_days(other.date.days)?)?;
        Self::from_total_nanoseconds(sum.0, largest)
    }

    /// Subtracts a duration; the negation of [`Self::add`].
    pub fn subtract(&self, other: &Self) -> TemporaResult<Self> {
        self.add(&other.negated())
    }

    fn from_total_nanoseconds(total_ns: i128, largest_unit: Unit) -> TemporaResult<Self> {
        // Truncating division keeps the day and time portions sharing
        // a sign.
        let (days, time_ns) = if largest_unit >= Unit::Day {
            (
                total_ns / i128::from(NS_PER_DAY),
                total_ns % i128::from(NS_PER_DAY),
            )
        } else {
            (0, total_ns)
        };
        let time = balance_time_fields(time_ns, largest_unit)?;
        Self::from_parts(DateDuration::from_days(expect_i64(days)?), time)
    }

    // ==== Rounding and totals ====

    /// Rounds this duration to the requested units, balancing between
    /// them against the reference point when calendar units are
    /// involved.
    pub fn round(
        &self,
        options: RoundingOptions,
        relative_to: Option<&RelativeTo>,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Self> {
        let resolved =
            ResolvedRoundingOptions::from_duration_options(options, self.default_largest_unit())?;
        match relative_to {
            None => {
                if resolved.largest_unit.is_calendar_unit()
                    || resolved.smallest_unit.is_calendar_unit()
                    || self.has_calendar_fields()
                {
                    return Err(TemporaError::range().with_message(
                        "rounding through calendar units requires a reference point",
                    ));
                }
                let total = self.time.to_normalized()?.add_days(self.date.days)?;
                let rounded = round_time_total(total.0, resolved)?;
                Self::from_total_nanoseconds(rounded, resolved.largest_unit)
            }
            Some(RelativeTo::PlainDate(date)) => {
                let record = self.to_normalized()?;
                let (origin, target) = date_relative_span(date, &record)?;
                let rounded =
                    diff_iso_datetime_with_rounding(origin, target, date.calendar(), resolved)?;
                Self::from_normalized(rounded, resolved.largest_unit)
            }
            Some(RelativeTo::ZonedDateTime(zdt)) => {
                let record = self.to_normalized()?;
                let target_ns = zdt.add_normalized(&record, provider)?;
                if resolved.largest_unit.is_time_unit() {
                    let diff = target_ns.as_i128() - zdt.epoch_nanoseconds().as_i128();
                    let rounded = round_time_total(diff, resolved)?;
                    Self::from_total_nanoseconds(rounded, resolved.largest_unit)
                } else {
                    let rounded =
                        zdt.diff_to_epoch_with_rounding(target_ns.as_i128(), resolved, provider)?;
                    Self::from_normalized(rounded, resolved.largest_unit)
                }
            }
        }
    }

    /// The total length of this duration expressed in a single unit.
    pub fn total(
        &self,
        unit: Unit,
        relative_to: Option<&RelativeTo>,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<f64> {
        if unit == Unit::Auto {
            return Err(TemporaError::range().with_message("total requires a concrete unit"));
        }
        let resolved = ResolvedRoundingOptions {
            largest_unit: unit,
            smallest_unit: unit,
            increment: RoundingIncrement::ONE,
            rounding_mode: RoundingMode::Trunc,
        };
        match relative_to {
            None => {
                if unit.is_calendar_unit() || self.has_calendar_fields() {
                    return Err(TemporaError::range().with_message(
                        "totaling through calendar units requires a reference point",
                    ));
                }
                let total = self.time.to_normalized()?.add_days(self.date.days)?;
                let length = unit.as_nanoseconds().tempora_unwrap()?;
                Ok(total.0 as f64 / length as f64)
            }
            Some(RelativeTo::PlainDate(date)) => {
                let record = self.to_normalized()?;
                let (origin, target) = date_relative_span(date, &record)?;
                let diff = diff_iso_datetime(origin, target, date.calendar(), unit)?;
                let anchor = RoundAnchor {
                    date: origin.date,
                    time: origin.time,
                    calendar: date.calendar(),
                    timezone: None,
                };
                let (_, total) =
                    diff.round_relative(target.utc_epoch_nanoseconds(), &anchor, resolved)?;
                total.tempora_unwrap()
            }
            Some(RelativeTo::ZonedDateTime(zdt)) => {
                let record = self.to_normalized()?;
                let target_ns = zdt.add_normalized(&record, provider)?;
                if unit.is_time_unit() {
                    let diff = target_ns.as_i128() - zdt.epoch_nanoseconds().as_i128();
                    let length = unit.as_nanoseconds().tempora_unwrap()?;
                    return Ok(diff as f64 / length as f64);
                }
                let diff = zdt.diff_to_epoch(target_ns.as_i128(), unit, provider)?;
                let civil = zdt.iso_datetime(provider)?;
                let anchor = RoundAnchor {
                    date: civil.date,
                    time: civil.time,
                    calendar: zdt.calendar(),
                    timezone: Some((zdt.timezone(), provider)),
                };
                let (_, total) = diff.round_relative(target_ns.as_i128(), &anchor, resolved)?;
                total.tempora_unwrap()
            }
        }
    }

    /// Orders two durations by total length.
    pub fn compare(
        &self,
        other: &Self,
        relative_to: Option<&RelativeTo>,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Ordering> {
        if self == other {
            return Ok(Ordering::Equal);
        }
        let needs_anchor = self.has_calendar_fields()
            || other.has_calendar_fields()
            || (matches!(relative_to, Some(RelativeTo::ZonedDateTime(_)))
                && (self.date.days != 0 || other.date.days != 0));
        if !needs_anchor {
            let a = self.time.to_normalized()?.add_days(self.date.days)?;
            let b = other.time.to_normalized()?.add_days(other.date.days)?;
            return Ok(a.0.cmp(&b.0));
        }
        let relative = relative_to.ok_or_else(|| {
            TemporaError::range()
                .with_message("comparing durations with calendar units requires a reference point")
        })?;
        let a = relative.epoch_target(self, provider)?;
        let b = relative.epoch_target(other, provider)?;
        Ok(a.cmp(&b))
    }

    // ==== Rendering ====

    /// Renders per the provided seconds precision.
    pub fn as_temporal_string(&self, options: ToStringRoundingOptions) -> TemporaResult<String> {
        let resolved = options.resolve()?;
        let duration = if resolved.smallest_unit == Unit::Nanosecond
            && resolved.increment.get() == 1
        {
            *self
        } else {
            self.round_for_display(resolved.smallest_unit, resolved.increment, resolved.rounding_mode)?
        };
        Ok(FormattableDuration {
            duration: &duration,
            precision: resolved.precision,
        }
        .write_to_string()
        .into_owned())
    }

    /// Rounds the sub-minute portion for display, leaving larger
    /// fields unbalanced as provided.
    fn round_for_display(
        &self,
        smallest_unit: Unit,
        increment: RoundingIncrement,
        mode: RoundingMode,
    ) -> TemporaResult<Self> {
        let length = smallest_unit.as_nanoseconds().tempora_unwrap()?;
        let step =
            NonZeroU128::new(u128::from(length) * u128::from(increment.get())).tempora_unwrap()?;
        let mut result = *self;
        if smallest_unit == Unit::Minute {
            let norm = NormalizedTimeDuration::from_time_fields(
                0,
                self.time.minutes,
                self.time.seconds,
                self.time.milliseconds,
                self.time.microseconds,
                self.time.nanoseconds,
            )?;
            let rounded = norm.round_to_increment(step, mode)?;
            result.time.minutes = expect_i64(rounded / NS_PER_MINUTE)?;
            result.time.seconds = 0;
            result.time.milliseconds = 0;
            result.time.microseconds = 0;
            result.time.nanoseconds = 0;
        } else {
            let norm = NormalizedTimeDuration::from_time_fields(
                0,
                0,
                self.time.seconds,
                self.time.milliseconds,
                self.time.microseconds,
                self.time.nanoseconds,
            )?;
            let rounded = norm.round_to_increment(step, mode)?;
            result.time.seconds = expect_i64(rounded / NS_PER_SECOND)?;
            let sub = rounded % NS_PER_SECOND;
            result.time.milliseconds = expect_i64(sub / NS_PER_MILLISECOND)?;
            result.time.microseconds = expect_i64(sub % NS_PER_MILLISECOND / NS_PER_MICROSECOND)?;
            result.time.nanoseconds = expect_i64(sub % NS_PER_MICROSECOND)?;
        }
        Ok(result)
    }
}

impl RelativeTo {
    /// The instant reached by adding `duration` to this reference
    /// point.
    fn epoch_target(
        &self,
        duration: &Duration,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<i128> {
        let record = duration.to_normalized()?;
        match self {
            Self::PlainDate(date) => {
                let (_, target) = date_relative_span(date, &record)?;
                Ok(target.utc_epoch_nanoseconds())
            }
            Self::ZonedDateTime(zdt) => {
                Ok(zdt.add_normalized(&record, provider)?.as_i128())
            }
        }
    }
}

/// The civil span covered by adding `record` to a date anchored at
/// midnight.
fn date_relative_span(
    date: &PlainDate,
    record: &NormalizedDurationRecord,
) -> TemporaResult<(IsoDateTime, IsoDateTime)> {
    let added = date
        .calendar()
        .date_add(date.iso(), &record.date(), ArithmeticOverflow::Constrain)?;
    let (carry, time) = IsoTime::default().add(record.normalized_time());
    let target_date = IsoDate::from_epoch_days(added.to_epoch_days() + carry);
    let origin = IsoDateTime::new_unchecked(date.iso(), IsoTime::default());
    let target = IsoDateTime::new(target_date, time)?;
    Ok((origin, target))
}

fn round_time_total(total_ns: i128, options: ResolvedRoundingOptions) -> TemporaResult<i128> {
    let length = options.smallest_unit.as_nanoseconds().tempora_unwrap()?;
    let step = NonZeroU128::new(u128::from(length) * u128::from(options.increment.get()))
        .tempora_unwrap()?;
    IncrementRounder::from_signed_num(total_ns, step)?.round(options.rounding_mode)
}

/// Extracts clock fields from a nanosecond total, filling fields from
/// `largest_unit` (capped at hours) downward.
fn balance_time_fields(total_ns: i128, largest_unit: Unit) -> TemporaResult<TimeDuration> {
    let cap = if largest_unit > Unit::Hour {
        Unit::Hour
    } else {
        largest_unit
    };
    let mut rem = total_ns;
    let mut time = TimeDuration::default();
    if cap >= Unit::Hour {
        time.hours = expect_i64(rem / NS_PER_HOUR)?;
        rem %= NS_PER_HOUR;
    }
    if cap >= Unit::Minute {
        time.minutes = expect_i64(rem / NS_PER_MINUTE)?;
        rem %= NS_PER_MINUTE;
    }
    if cap >= Unit::Second {
        time.seconds = expect_i64(rem / NS_PER_SECOND)?;
        rem %= NS_PER_SECOND;
    }
    if cap >= Unit::Millisecond {
        time.milliseconds = expect_i64(rem / NS_PER_MILLISECOND)?;
        rem %= NS_PER_MILLISECOND;
    }
    if cap >= Unit::Microsecond {
        time.microseconds = expect_i64(rem / NS_PER_MICROSECOND)?;
        rem %= NS_PER_MICROSECOND;
    }
    time.nanoseconds = expect_i64(rem)?;
    Ok(time)
}

/// Validates sign agreement across all fields and the individual
/// field ranges.
fn validate_duration_fields(fields: &[i64]) -> TemporaResult<()> {
    let mut sign = Sign::Zero;
    for &field in fields {
        let field_sign = Sign::from_i64(field);
        if field_sign == Sign::Zero {
            continue;
        }
        if sign == Sign::Zero {
            sign = field_sign;
        } else if sign != field_sign {
            return Err(TemporaError::range()
                .with_message("all duration fields must share a sign"));
        }
    }
    // Years, months, and weeks are bounded directly; the remaining
    // fields are bounded by their combined nanosecond total.
    for &field in fields.iter().take(3) {
        if field.abs() >= TWO_POW_32 {
            return Err(TemporaError::range()
                .with_message("duration calendar fields must be less than 2^32"));
        }
    }
    Ok(())
}

fn expect_i64(value: i128) -> TemporaResult<i64> {
    i64::try_from(value)
        .map_err(|_| TemporaError::range().with_message("duration field exceeds the valid range"))
}

impl FromStr for Duration {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parsers::parse_duration(s)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        FormattableDuration {
            duration: self,
            precision: Precision::Auto,
        }
        .write_to(f)
    }
}
