//! Normalized time durations and rounding against a reference point.
//!
//! The time portion of a duration is normalized to a single `i128`
//! nanosecond total for arithmetic. Rounding through units whose
//! length varies (years, months, weeks, and days under a time zone)
//! cannot be done on the total alone: the duration is *nudged* between
//! the two nearest increment multiples measured against the reference
//! point, and any overflow then *bubbles* into the larger units.

use crate::{
    calendar::Calendar,
    invariant,
    iso::{utc_epoch_nanos, IsoDate, IsoDateTime, IsoTime},
    options::{ArithmeticOverflow, Disambiguation, ResolvedRoundingOptions, Unit},
    provider::TimeZoneProvider,
    rounding::IncrementRounder,
    timezone::TimeZone,
    TemporaError, TemporaResult, TemporaUnwrap, Sign, NS_PER_DAY,
};

use super::DateDuration;

use core::num::NonZeroU128;
use core::ops::Neg;

/// The maximum normalized time duration: 2^53 - 1 seconds and all the
/// nanoseconds that fit beneath them.
pub(crate) const MAX_TIME_DURATION: i128 = 9_007_199_254_740_991_999_999_999;

const NS_PER_SECOND: i128 = 1_000_000_000;

/// The time portion of a duration, normalized to nanoseconds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct NormalizedTimeDuration(pub(crate) i128);

impl NormalizedTimeDuration {
    pub(crate) fn from_nanoseconds(nanos: i128) -> TemporaResult<Self> {
        if nanos.abs() > MAX_TIME_DURATION {
            return Err(TemporaError::range()
                .with_message("time duration exceeds the maximum normalized range"));
        }
        Ok(Self(nanos))
    }

    /// Normalizes the six time fields into a nanosecond total.
    pub(crate) fn from_time_fields(
        hours: i64,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
        microseconds: i64,
        nanoseconds: i64,
    ) -> TemporaResult<Self> {
        let total = i128::from(hours) * 3_600 * NS_PER_SECOND
            + i128::from(minutes) * 60 * NS_PER_SECOND
            + i128::from(seconds) * NS_PER_SECOND
            + i128::from(milliseconds) * 1_000_000
            + i128::from(microseconds) * 1_000
            + i128::from(nanoseconds);
        Self::from_nanoseconds(total)
    }

    /// Adds whole days at 24 hours apiece.
    pub(crate) fn add_days(self, days: i64) -> TemporaResult<Self> {
        Self::from_nanoseconds(self.0 + i128::from(days) * i128::from(NS_PER_DAY))
    }

    pub(crate) fn checked_add(self, other: Self) -> TemporaResult<Self> {
        Self::from_nanoseconds(self.0 + other.0)
    }

    pub(crate) fn sign(self) -> Sign {
        Sign::from_i128(self.0)
    }

    pub(crate) fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Rounds to a multiple of `increment` nanoseconds.
    pub(crate) fn round_to_increment(
        self,
        increment: NonZeroU128,
        mode: crate::options::RoundingMode,
    ) -> TemporaResult<i128> {
        IncrementRounder::from_signed_num(self.0, increment)?.round(mode)
    }
}

impl Neg for NormalizedTimeDuration {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

// ==== NormalizedDurationRecord ====

/// A date duration paired with a normalized time duration, with signs
/// guaranteed to agree.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NormalizedDurationRecord {
    date: DateDuration,
    norm: NormalizedTimeDuration,
}

impl NormalizedDurationRecord {
    pub(crate) fn new(date: DateDuration, norm: NormalizedTimeDuration) -> TemporaResult<Self> {
        let date_sign = date.sign();
        let time_sign = norm.sign();
        if date_sign != Sign::Zero && time_sign != Sign::Zero && date_sign != time_sign {
            return Err(TemporaError::range()
                .with_message("duration date and time portions must share a sign"));
        }
        Ok(Self { date, norm })
    }

    pub(crate) fn date(&self) -> DateDuration {
        self.date
    }

    pub(crate) fn normalized_time(&self) -> NormalizedTimeDuration {
        self.norm
    }

    pub(crate) fn sign(&self) -> Sign {
        let date_sign = self.date.sign();
        if date_sign != Sign::Zero {
            date_sign
        } else {
            self.norm.sign()
        }
    }
}

// ==== Relative rounding ====

/// The reference point a duration is rounded against: a civil
/// timestamp, its calendar, and optionally a time zone through which
/// civil readings map to exact time.
pub(crate) struct RoundAnchor<'a> {
    pub(crate) date: IsoDate,
    pub(crate) time: IsoTime,
    pub(crate) calendar: Calendar,
    pub(crate) timezone: Option<(&'a TimeZone, &'a dyn TimeZoneProvider)>,
}

impl RoundAnchor<'_> {
    /// Exact time of a civil reading relative to this anchor.
    pub(crate) fn epoch_ns_for(&self, date: IsoDate, time: IsoTime) -> TemporaResult<i128> {
        match self.timezone {
            Some((tz, provider)) => Ok(tz
                .get_epoch_nanoseconds_for(
                    IsoDateTime::new_unchecked(date, time),
                    Disambiguation::Compatible,
                    provider,
                )?
                .as_i128()),
            None => Ok(utc_epoch_nanos(date, time)),
        }
    }
}

#[derive(Debug)]
struct NudgeRecord {
    normalized: NormalizedDurationRecord,
    total: Option<f64>,
    nudge_epoch_ns: i128,
    expanded: bool,
}

impl NormalizedDurationRecord {
    /// Rounds this duration at the smallest unit against the anchor,
    /// bubbling any overflow into larger units, and returns the
    /// rounded record together with the total in the smallest unit.
    pub(crate) fn round_relative(
        &self,
        dest_epoch_ns: i128,
        anchor: &RoundAnchor<'_>,
        options: ResolvedRoundingOptions,
    ) -> TemporaResult<(Self, Option<f64>)> {
        let irregular = options.smallest_unit.is_calendar_unit()
            || (anchor.timezone.is_some() && options.smallest_unit == Unit::Day);
        let nudge = if irregular {
            self.nudge_calendar_unit(dest_epoch_ns, anchor, options)?
        } else if anchor.timezone.is_some() {
            self.nudge_zoned_time(anchor, options)?
        } else {
            self.nudge_day_or_time(dest_epoch_ns, options)?
        };

        let mut result = nudge.normalized;
        if nudge.expanded && options.smallest_unit != options.largest_unit {
            result = result.bubble(
                nudge.nudge_epoch_ns,
                anchor,
                options.largest_unit,
                options.smallest_unit,
            )?;
        }
        Ok((result, nudge.total))
    }

    /// Nudges at a unit of irregular length by measuring the two
    /// nearest increment multiples against the anchor.
    fn nudge_calendar_unit(
        &self,
        dest_epoch_ns: i128,
        anchor: &RoundAnchor<'_>,
        options: ResolvedRoundingOptions,
    ) -> TemporaResult<NudgeRecord> {
        let sign = i64::from(self.sign().as_sign_multiplier());
        let sign = if sign == 0 { 1 } else { sign };
        let increment = i64::from(options.increment.get());

        let date = self.date();
        let (r1, start_duration, end_duration) = match options.smallest_unit {
            Unit::Year => {
                let r1 = (date.years / increment) * increment;
                let r2 = r1 + increment * sign;
                (r1, DateDuration::from_years(r1), DateDuration::from_years(r2))
            }
            Unit::Month => {
                let r1 = (date.months / increment) * increment;
                let r2 = r1 + increment * sign;
                (
                    r1,
                    DateDuration {
                        years: date.years,
                        months: r1,
                        weeks: 0,
                        days: 0,
                    },
                    DateDuration {
                        years: date.years,
                        months: r2,
                        weeks: 0,
                        days: 0,
                    },
                )
            }
            Unit::Week => {
                let r1 = (date.weeks / increment) * increment;
                let r2 = r1 + increment * sign;
                (
                    r1,
                    DateDuration {
                        years: date.years,
                        months: date.months,
                        weeks: r1,
                        days: 0,
                    },
                    DateDuration {
                        years: date.years,
                        months: date.months,
                        weeks: r2,
                        days: 0,
                    },
                )
            }
            Unit::Day => {
                let r1 = (date.days / increment) * increment;
                let r2 = r1 + increment * sign;
                (
                    r1,
                    DateDuration { days: r1, ..date },
                    DateDuration { days: r2, ..date },
                )
            }
            _ => {
                return Err(TemporaError::assert()
                    .with_message("nudge at a calendar unit requires a calendar or day unit"))
            }
        };

        let start = anchor
            .calendar
            .date_add(anchor.date, &start_duration, ArithmeticOverflow::Constrain)?;
        let end = anchor
            .calendar
            .date_add(anchor.date, &end_duration, ArithmeticOverflow::Constrain)?;
        let start_ns = anchor.epoch_ns_for(start, anchor.time)?;
        let end_ns = anchor.epoch_ns_for(end, anchor.time)?;

        let numerator = dest_epoch_ns - start_ns;
        let denominator = end_ns - start_ns;
        invariant!(denominator != 0, "unit boundaries must be distinct instants");

        let progress = numerator as f64 / denominator as f64;
        let total = r1 as f64 + progress * increment as f64 * sign as f64;

        // Choose between r1 and r2 with exact integer comparisons on
        // the progress fraction.
        let unsigned_mode = options.rounding_mode.get_unsigned_round_mode(sign >= 0);
        let num_abs = numerator.unsigned_abs();
        let den_abs = denominator.unsigned_abs();
        use crate::options::UnsignedRoundingMode as Urm;
        use core::cmp::Ordering;
        let expand = if num_abs == 0 {
            false
        } else {
            match unsigned_mode {
                Urm::Zero => false,
                Urm::Infinity => true,
                half => match (num_abs * 2).cmp(&den_abs) {
                    Ordering::Less => false,
                    Ordering::Greater => true,
                    Ordering::Equal => match half {
                        Urm::HalfZero => false,
                        Urm::HalfInfinity => true,
                        _ => (r1 / increment) % 2 != 0,
                    },
                },
            }
        };

        let (duration, nudge_epoch_ns, expanded) = if expand {
            (end_duration, end_ns, true)
        } else {
            (start_duration, start_ns, false)
        };
        Ok(NudgeRecord {
            normalized: Self::new(duration, NormalizedTimeDuration::default())?,
            total: Some(total),
            nudge_epoch_ns,
            expanded,
        })
    }

    /// Nudges at a fixed-length unit when days are regular.
    fn nudge_day_or_time(
        &self,
        dest_epoch_ns: i128,
        options: ResolvedRoundingOptions,
    ) -> TemporaResult<NudgeRecord> {
        let norm = self.normalized_time().add_days(self.date().days)?;
        let unit_length = options
            .smallest_unit
            .as_nanoseconds()
            .tempora_unwrap()?;
        let increment = NonZeroU128::new(
            u128::from(unit_length) * u128::from(options.increment.get()),
        )
        .tempora_unwrap()?;
        let rounded = norm.round_to_increment(increment, options.rounding_mode)?;
        let diff = rounded - norm.0;
        let total = norm.0 as f64 / unit_length as f64;

        let (days, remainder) = if options.largest_unit >= Unit::Day {
            (rounded / i128::from(NS_PER_DAY), rounded % i128::from(NS_PER_DAY))
        } else {
            (0, rounded)
        };
        let expanded = days.unsigned_abs() > self.date().days.unsigned_abs() as u128;
        let date = DateDuration {
            days: i128_to_i64(days)?,
            ..self.date()
        };
        Ok(NudgeRecord {
            normalized: Self::new(date, NormalizedTimeDuration::from_nanoseconds(remainder)?)?,
            total: Some(total),
            nudge_epoch_ns: dest_epoch_ns + diff,
            expanded,
        })
    }

    /// Nudges at a time unit against a zone, where the surrounding
    /// day's length may not be 24 hours.
    fn nudge_zoned_time(
        &self,
        anchor: &RoundAnchor<'_>,
        options: ResolvedRoundingOptions,
    ) -> TemporaResult<NudgeRecord> {
        let sign = i64::from(self.sign().as_sign_multiplier());
        let sign = if sign == 0 { 1 } else { sign };

        let start = anchor
            .calendar
            .date_add(anchor.date, &self.date(), ArithmeticOverflow::Constrain)?;
        let start_ns = anchor.epoch_ns_for(start, anchor.time)?;
        let end = IsoDate::from_epoch_days(start.to_epoch_days() + sign);
        let end_ns = anchor.epoch_ns_for(end, anchor.time)?;
        let day_span = end_ns - start_ns;
        invariant!(
            Sign::from_i128(day_span) == Sign::from_i64(sign),
            "a civil day must span a nonzero, sign-consistent stretch of exact time"
        );

        let unit_length = options
            .smallest_unit
            .as_nanoseconds()
            .tempora_unwrap()?;
        let increment = NonZeroU128::new(
            u128::from(unit_length) * u128::from(options.increment.get()),
        )
        .tempora_unwrap()?;
        let rounded = self
            .normalized_time()
            .round_to_increment(increment, options.rounding_mode)?;
        let total = self.normalized_time().0 as f64 / unit_length as f64;

        let beyond = rounded - day_span;
        let crossed_day = beyond == 0 || Sign::from_i128(beyond) == Sign::from_i64(sign);
        let (day_delta, remainder, expanded) = if crossed_day {
            (sign, beyond, true)
        } else {
            (0, rounded, false)
        };
        let date = DateDuration {
            days: self.date().days + day_delta,
            ..self.date()
        };
        Ok(NudgeRecord {
            normalized: Self::new(date, NormalizedTimeDuration::from_nanoseconds(remainder)?)?,
            total: Some(total),
            nudge_epoch_ns: start_ns + rounded,
            expanded,
        })
    }

    /// Propagates a nudge that crossed a unit boundary into the larger
    /// units, from just above the smallest unit up to the largest.
    fn bubble(
        &self,
        nudge_epoch_ns: i128,
        anchor: &RoundAnchor<'_>,
        largest_unit: Unit,
        smallest_unit: Unit,
    ) -> TemporaResult<Self> {
        let sign = i64::from(self.sign().as_sign_multiplier());
        if sign == 0 {
            return Ok(*self);
        }
        let mut duration = *self;
        for unit in [Unit::Day, Unit::Week, Unit::Month, Unit::Year] {
            if unit <= smallest_unit {
                continue;
            }
            if unit > largest_unit {
                break;
            }
            // Weeks only absorb days when the result is expressed in
            // weeks.
            if unit == Unit::Week && largest_unit != Unit::Week {
                continue;
            }
            let date = duration.date();
            let end_duration = match unit {
                Unit::Year => DateDuration::from_years(date.years + sign),
                Unit::Month => DateDuration {
                    years: date.years,
                    months: date.months + sign,
                    weeks: 0,
                    days: 0,
                },
                Unit::Week => DateDuration {
                    years: date.years,
                    months: date.months,
                    weeks: date.weeks + sign,
                    days: 0,
                },
                _ => DateDuration {
                    days: date.days + sign,
                    ..date
                },
            };
            let end = anchor
                .calendar
                .date_add(anchor.date, &end_duration, ArithmeticOverflow::Constrain)?;
            let end_ns = anchor.epoch_ns_for(end, anchor.time)?;
            let beyond = nudge_epoch_ns - end_ns;
            if beyond == 0 || Sign::from_i128(beyond) == Sign::from_i64(sign) {
                duration = Self::new(end_duration, NormalizedTimeDuration::default())?;
            } else {
                break;
            }
        }
        Ok(duration)
    }
}

fn i128_to_i64(value: i128) -> TemporaResult<i64> {
    i64::try_from(value)
        .map_err(|_| TemporaError::range().with_message("duration field exceeds the valid range"))
}

// ==== Date-time differencing ====

/// The difference between two civil date-times, expressed with date
/// units no larger than `largest_unit`.
pub(crate) fn diff_iso_datetime(
    dt1: IsoDateTime,
    dt2: IsoDateTime,
    calendar: Calendar,
    largest_unit: Unit,
) -> TemporaResult<NormalizedDurationRecord> {
    let mut time_ns = i128::from(dt1.time.diff(dt2.time));
    let date_sign = match dt2.date.cmp(&dt1.date) {
        core::cmp::Ordering::Greater => 1i64,
        core::cmp::Ordering::Equal => 0,
        core::cmp::Ordering::Less => -1,
    };
    let mut adjusted = dt2.date;
    // A time running against the date borrows one day.
    if date_sign != 0 && Sign::from_i128(time_ns) == Sign::from_i64(-date_sign) {
        adjusted = IsoDate::from_epoch_days(adjusted.to_epoch_days() - date_sign);
        time_ns += i128::from(date_sign) * i128::from(NS_PER_DAY);
    }

    let date_largest = largest_unit.larger(Unit::Day)?;
    let mut date_diff = calendar.date_until(dt1.date, adjusted, date_largest)?;
    if !largest_unit.is_date_unit() {
        time_ns += i128::from(date_diff.days) * i128::from(NS_PER_DAY);
        date_diff.days = 0;
    }
    NormalizedDurationRecord::new(date_diff, NormalizedTimeDuration::from_nanoseconds(time_ns)?)
}

/// Differences two civil date-times and rounds the result against the
/// earlier of them.
pub(crate) fn diff_iso_datetime_with_rounding(
    dt1: IsoDateTime,
    dt2: IsoDateTime,
    calendar: Calendar,
    options: ResolvedRoundingOptions,
) -> TemporaResult<NormalizedDurationRecord> {
    let record = diff_iso_datetime(dt1, dt2, calendar, options.largest_unit)?;
    if options.is_noop() {
        return Ok(record);
    }
    let anchor = RoundAnchor {
        date: dt1.date,
        time: dt1.time,
        calendar,
        timezone: None,
    };
    record
        .round_relative(dt2.utc_epoch_nanoseconds(), &anchor, options)
        .map(|(rounded, _)| rounded)
}
