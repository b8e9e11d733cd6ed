//! Internal ISO-8601 date and time records.
//!
//! `IsoDate`, `IsoTime`, and `IsoDateTime` are the plain records every
//! civil type is built on. They carry no calendar: calendar-aware
//! arithmetic converts to and from these records at the boundary.
//!
//! Conversions between calendar dates and epoch days use exact integer
//! arithmetic over 400-year eras, so the records are valid across the
//! whole representable range of exact time.

use crate::{
    duration::{normalized::NormalizedTimeDuration, DateDuration},
    options::{ArithmeticOverflow, ResolvedRoundingOptions, Unit},
    rounding::IncrementRounder,
    TemporaError, TemporaResult, TemporaUnwrap, NS_MAX_INSTANT, NS_MIN_INSTANT, NS_PER_DAY,
};
use core::num::NonZeroU128;

// ==== IsoDate ====

/// A calendar-free ISO-8601 date record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct IsoDate {
    pub(crate) year: i32,
    pub(crate) month: u8,
    pub(crate) day: u8,
}

impl IsoDate {
    pub(crate) const fn new_unchecked(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Creates a date record, clamping or rejecting out-of-range
    /// fields per the overflow behavior.
    pub(crate) fn new_with_overflow(
        year: i32,
        month: i32,
        day: i32,
        overflow: ArithmeticOverflow,
    ) -> TemporaResult<Self> {
        match overflow {
            ArithmeticOverflow::Constrain => {
                let month = month.clamp(1, 12) as u8;
                let day = day.clamp(1, i32::from(iso_days_in_month(year, month))) as u8;
                Ok(Self::new_unchecked(year, month, day))
            }
            ArithmeticOverflow::Reject => {
                if !(1..=12).contains(&month) {
                    return Err(
                        TemporaError::range().with_message("month must be between 1 and 12")
                    );
                }
                let month = month as u8;
                if !(1..=i32::from(iso_days_in_month(year, month))).contains(&day) {
                    return Err(
                        TemporaError::range().with_message("day is not valid for the month")
                    );
                }
                Ok(Self::new_unchecked(year, month, day as u8))
            }
        }
    }

    pub(crate) fn is_valid(self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=iso_days_in_month(self.year, self.month)).contains(&self.day)
    }

    /// Returns the days since the Unix epoch.
    pub(crate) fn to_epoch_days(self) -> i64 {
        iso_date_to_epoch_days(self.year, i32::from(self.month), i32::from(self.day))
    }

    pub(crate) fn from_epoch_days(epoch_days: i64) -> Self {
        let z = epoch_days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let year_of_era = yoe + era * 400;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        Self::new_unchecked(
            (year_of_era + i64::from(month <= 2)) as i32,
            month as u8,
            day as u8,
        )
    }

    /// Balances arbitrarily out-of-range fields into a valid record.
    pub(crate) fn balance(year: i32, month: i32, day: i32) -> Self {
        let (year, month) = balance_iso_year_month(i64::from(year), i64::from(month));
        let epoch_days = iso_date_to_epoch_days(year as i32, month as i32, 1) + i64::from(day) - 1;
        Self::from_epoch_days(epoch_days)
    }

    /// ISO day of the week, Monday 1 through Sunday 7.
    pub(crate) fn day_of_week(self) -> u8 {
        // The epoch day itself was a Thursday.
        ((self.to_epoch_days() + 3).rem_euclid(7) + 1) as u8
    }

    /// Ordinal day of the year, starting at 1.
    pub(crate) fn day_of_year(self) -> u16 {
        (self.to_epoch_days() - iso_date_to_epoch_days(self.year, 1, 1) + 1) as u16
    }

    /// Whether a date-time at noon on this date is within the
    /// supported range.
    pub(crate) fn is_within_limits(self) -> bool {
        let noon = utc_epoch_nanos(self, IsoTime::NOON);
        NS_MIN_INSTANT <= noon && noon <= NS_MAX_INSTANT
    }

    /// Adds a date duration: years and months in month-space with the
    /// day regulated by the overflow behavior, then weeks and days in
    /// epoch-day space.
    pub(crate) fn add_date_duration(
        self,
        duration: &DateDuration,
        overflow: ArithmeticOverflow,
    ) -> TemporaResult<Self> {
        let year = i64::from(self.year) + duration.years;
        let month = i64::from(self.month) + duration.months;
        let (year, month) = balance_iso_year_month(year, month);
        let year = i32::try_from(year).map_err(|_| date_out_of_range())?;
        let intermediate =
            Self::new_with_overflow(year, month as i32, i32::from(self.day), overflow)?;

        let days = duration
            .weeks
            .checked_mul(7)
            .and_then(|weeks| weeks.checked_add(duration.days))
            .ok_or_else(date_out_of_range)?;
        let epoch_days = intermediate
            .to_epoch_days()
            .checked_add(days)
            .ok_or_else(date_out_of_range)?;
        // Keep the conversion math far away from i64 overflow; real
        // range enforcement happens against the instant limits.
        if epoch_days.abs() > 100_000_000_000 {
            return Err(date_out_of_range());
        }
        Ok(Self::from_epoch_days(epoch_days))
    }

    /// The difference from `self` to `other` expressed in units no
    /// larger than `largest_unit`.
    ///
    /// Year and month counts grow while the receiver's raw day field,
    /// carried along unconstrained, has not moved past the target.
    /// Comparing the unconstrained field tuple keeps end-of-month
    /// differences honest: Jan 31 to Feb 28 is 28 days, not a month.
    pub(crate) fn diff(self, other: Self, largest_unit: Unit) -> TemporaResult<DateDuration> {
        if self == other {
            return Ok(DateDuration::default());
        }
        let sign: i64 = if self < other { 1 } else { -1 };

        let mut years = 0i64;
        if largest_unit == Unit::Year {
            let mut candidate = i64::from(other.year) - i64::from(self.year);
            if candidate != 0 {
                candidate -= sign;
            }
            while !surpasses(
                sign,
                i64::from(self.year) + candidate + sign,
                i64::from(self.month),
                i64::from(self.day),
                other,
            ) {
                candidate += sign;
            }
            years = candidate;
        }

        let mut months = 0i64;
        if matches!(largest_unit, Unit::Year | Unit::Month) {
            let mut candidate = sign;
            loop {
                let (year, month) = balance_iso_year_month(
                    i64::from(self.year) + years,
                    i64::from(self.month) + candidate,
                );
                if surpasses(sign, year, month, i64::from(self.day), other) {
                    break;
                }
                months = candidate;
                candidate += sign;
            }
        }

        let (year, month) = balance_iso_year_month(
            i64::from(self.year) + years,
            i64::from(self.month) + months,
        );
        let intermediate = Self::new_with_overflow(
            year as i32,
            month as i32,
            i32::from(self.day),
            ArithmeticOverflow::Constrain,
        )?;
        let mut days = other.to_epoch_days() - intermediate.to_epoch_days();
        let mut weeks = 0;
        if largest_unit == Unit::Week {
            weeks = days / 7;
            days %= 7;
        }
        Ok(DateDuration {
            years,
            months,
            weeks,
            days,
        })
    }
}

/// Whether the raw field tuple has moved past `target` in the
/// direction of `sign`.
fn surpasses(sign: i64, year: i64, month: i64, day: i64, target: IsoDate) -> bool {
    let ordering = (year, month, day).cmp(&(
        i64::from(target.year),
        i64::from(target.month),
        i64::from(target.day),
    ));
    if sign > 0 {
        ordering == core::cmp::Ordering::Greater
    } else {
        ordering == core::cmp::Ordering::Less
    }
}

fn date_out_of_range() -> TemporaError {
    TemporaError::range().with_message("date is outside the supported range")
}

// ==== IsoTime ====

/// A wall-clock time record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct IsoTime {
    pub(crate) hour: u8,
    pub(crate) minute: u8,
    pub(crate) second: u8,
    pub(crate) millisecond: u16,
    pub(crate) microsecond: u16,
    pub(crate) nanosecond: u16,
}

impl IsoTime {
    pub(crate) const NOON: Self = Self {
        hour: 12,
        minute: 0,
        second: 0,
        millisecond: 0,
        microsecond: 0,
        nanosecond: 0,
    };

    pub(crate) const fn new_unchecked(
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
    ) -> Self {
        Self {
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
        }
    }

    /// Creates a time record, clamping or rejecting out-of-range
    /// fields per the overflow behavior.
    pub(crate) fn new_with_overflow(
        hour: i32,
        minute: i32,
        second: i32,
        millisecond: i32,
        microsecond: i32,
        nanosecond: i32,
        overflow: ArithmeticOverflow,
    ) -> TemporaResult<Self> {
        match overflow {
            ArithmeticOverflow::Constrain => Ok(Self::new_unchecked(
                hour.clamp(0, 23) as u8,
                minute.clamp(0, 59) as u8,
                second.clamp(0, 59) as u8,
                millisecond.clamp(0, 999) as u16,
                microsecond.clamp(0, 999) as u16,
                nanosecond.clamp(0, 999) as u16,
            )),
            ArithmeticOverflow::Reject => {
                let valid = (0..=23).contains(&hour)
                    && (0..=59).contains(&minute)
                    && (0..=59).contains(&second)
                    && (0..=999).contains(&millisecond)
                    && (0..=999).contains(&microsecond)
                    && (0..=999).contains(&nanosecond);
                if !valid {
                    return Err(
                        TemporaError::range().with_message("time field is out of range")
                    );
                }
                Ok(Self::new_unchecked(
                    hour as u8,
                    minute as u8,
                    second as u8,
                    millisecond as u16,
                    microsecond as u16,
                    nanosecond as u16,
                ))
            }
        }
    }

    pub(crate) fn is_valid(self) -> bool {
        self.hour < 24
            && self.minute < 60
            && self.second < 60
            && self.millisecond < 1000
            && self.microsecond < 1000
            && self.nanosecond < 1000
    }

    /// Nanoseconds elapsed since midnight.
    pub(crate) fn to_nanoseconds(self) -> u64 {
        let seconds =
            u64::from(self.hour) * 3600 + u64::from(self.minute) * 60 + u64::from(self.second);
        seconds * 1_000_000_000
            + u64::from(self.millisecond) * 1_000_000
            + u64::from(self.microsecond) * 1_000
            + u64::from(self.nanosecond)
    }

    /// Builds a record from nanoseconds since midnight; the input must
    /// be less than one day.
    pub(crate) fn from_nanoseconds_in_day(nanos: u64) -> Self {
        debug_assert!(nanos < NS_PER_DAY);
        let second_total = nanos / 1_000_000_000;
        let subsec = nanos % 1_000_000_000;
        Self::new_unchecked(
            (second_total / 3600) as u8,
            (second_total / 60 % 60) as u8,
            (second_total % 60) as u8,
            (subsec / 1_000_000) as u16,
            (subsec / 1_000 % 1_000) as u16,
            (subsec % 1_000) as u16,
        )
    }

    /// Balances arbitrarily out-of-range fields, returning the day
    /// carry alongside the wrapped time.
    pub(crate) fn balance(
        hour: i64,
        minute: i64,
        second: i64,
        millisecond: i64,
        microsecond: i64,
        nanosecond: i64,
    ) -> (i64, Self) {
        let microsecond = microsecond + nanosecond.div_euclid(1000);
        let nanosecond = nanosecond.rem_euclid(1000);
        let millisecond = millisecond + microsecond.div_euclid(1000);
        let microsecond = microsecond.rem_euclid(1000);
        let second = second + millisecond.div_euclid(1000);
        let millisecond = millisecond.rem_euclid(1000);
        let minute = minute + second.div_euclid(60);
        let second = second.rem_euclid(60);
        let hour = hour + minute.div_euclid(60);
        let minute = minute.rem_euclid(60);
        let days = hour.div_euclid(24);
        let hour = hour.rem_euclid(24);
        (
            days,
            Self::new_unchecked(
                hour as u8,
                minute as u8,
                second as u8,
                millisecond as u16,
                microsecond as u16,
                nanosecond as u16,
            ),
        )
    }

    /// Adds a normalized time duration, returning the day carry.
    pub(crate) fn add(self, norm: NormalizedTimeDuration) -> (i64, Self) {
        let total = i128::from(self.to_nanoseconds()) + norm.0;
        let days = total.div_euclid(i128::from(NS_PER_DAY));
        let remainder = total.rem_euclid(i128::from(NS_PER_DAY));
        (days as i64, Self::from_nanoseconds_in_day(remainder as u64))
    }

    /// Signed nanosecond difference from `self` to `other`.
    pub(crate) fn diff(self, other: Self) -> i64 {
        other.to_nanoseconds() as i64 - self.to_nanoseconds() as i64
    }

    /// Rounds the time to the resolved increment, returning the day
    /// carry.
    pub(crate) fn round(self, options: ResolvedRoundingOptions) -> TemporaResult<(i64, Self)> {
        let length = options
            .smallest_unit
            .as_nanoseconds()
            .tempora_unwrap()?;
        let increment = NonZeroU128::new(
            u128::from(length) * u128::from(options.increment.get()),
        )
        .tempora_unwrap()?;
        let quantity = i128::from(self.to_nanoseconds());
        let rounded = IncrementRounder::from_signed_num(quantity, increment)?
            .round(options.rounding_mode)?;
        let days = rounded.div_euclid(i128::from(NS_PER_DAY)) as i64;
        let remainder = rounded.rem_euclid(i128::from(NS_PER_DAY)) as u64;
        Ok((days, Self::from_nanoseconds_in_day(remainder)))
    }
}

// ==== IsoDateTime ====

/// A combined date and time record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct IsoDateTime {
    pub(crate) date: IsoDate,
    pub(crate) time: IsoTime,
}

impl IsoDateTime {
    pub(crate) const fn new_unchecked(date: IsoDate, time: IsoTime) -> Self {
        Self { date, time }
    }

    pub(crate) fn new(date: IsoDate, time: IsoTime) -> TemporaResult<Self> {
        let result = Self::new_unchecked(date, time);
        if !result.is_within_limits() {
            return Err(
                TemporaError::range().with_message("date-time is outside the supported range")
            );
        }
        Ok(result)
    }

    /// Whether the record is within the supported range: strictly
    /// inside the instant limits extended by one day on each side.
    pub(crate) fn is_within_limits(self) -> bool {
        let ns = self.utc_epoch_nanoseconds();
        NS_MIN_INSTANT - i128::from(NS_PER_DAY) < ns && ns < NS_MAX_INSTANT + i128::from(NS_PER_DAY)
    }

    /// The nanoseconds since the epoch of this civil reading taken as
    /// UTC.
    pub(crate) fn utc_epoch_nanoseconds(self) -> i128 {
        utc_epoch_nanos(self.date, self.time)
    }

    /// Splits nanoseconds since the epoch into a civil record.
    pub(crate) fn from_epoch_nanoseconds(nanos: i128) -> Self {
        let days = nanos.div_euclid(i128::from(NS_PER_DAY));
        let time_nanos = nanos.rem_euclid(i128::from(NS_PER_DAY));
        Self::new_unchecked(
            IsoDate::from_epoch_days(days as i64),
            IsoTime::from_nanoseconds_in_day(time_nanos as u64),
        )
    }
}

// ==== Shared date equations ====

pub(crate) fn is_iso_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub(crate) fn iso_days_in_year(year: i32) -> u16 {
    if is_iso_leap_year(year) {
        366
    } else {
        365
    }
}

pub(crate) fn iso_days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_iso_leap_year(year) => 29,
        2 => 28,
        // Out-of-range months only reach here under constrain, which
        // clamps before asking.
        _ => 0,
    }
}

/// Days since the Unix epoch of an ISO date, computed over 400-year
/// eras starting in March so leap days fall at era ends.
pub(crate) fn iso_date_to_epoch_days(year: i32, month: i32, day: i32) -> i64 {
    let shifted_year = i64::from(year) - i64::from(month <= 2);
    let era = shifted_year.div_euclid(400);
    let year_of_era = shifted_year - era * 400;
    let month_of_era = (i64::from(month) + 9).rem_euclid(12);
    let day_of_year = (153 * month_of_era + 2) / 5 + i64::from(day) - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

pub(crate) fn balance_iso_year_month(year: i64, month: i64) -> (i64, i64) {
    (
        year + (month - 1).div_euclid(12),
        (month - 1).rem_euclid(12) + 1,
    )
}

pub(crate) fn utc_epoch_nanos(date: IsoDate, time: IsoTime) -> i128 {
    i128::from(date.to_epoch_days()) * i128::from(NS_PER_DAY) + i128::from(time.to_nanoseconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{RoundingIncrement, RoundingMode};

    #[test]
    fn epoch_day_round_trips() {
        let cases = [
            (1970, 1, 1, 0),
            (1969, 12, 31, -1),
            (2000, 2, 29, 11_016),
            (2000, 3, 1, 11_017),
            (1600, 3, 1, -135_080),
            (-400, 3, 1, -865_565),
        ];
        for (year, month, day, expected) in cases {
            let date = IsoDate::new_unchecked(year, month as u8, day as u8);
            assert_eq!(date.to_epoch_days(), expected, "{year}-{month}-{day}");
            assert_eq!(IsoDate::from_epoch_days(expected), date);
        }
    }

    #[test]
    fn month_lengths() {
        assert_eq!(iso_days_in_month(2020, 2), 29);
        assert_eq!(iso_days_in_month(2100, 2), 28);
        assert_eq!(iso_days_in_month(2000, 2), 29);
        assert_eq!(iso_days_in_month(2021, 4), 30);
        assert_eq!(iso_days_in_month(2021, 12), 31);
    }

    #[test]
    fn day_of_week_and_year() {
        // 1970-01-01 was a Thursday.
        assert_eq!(IsoDate::new_unchecked(1970, 1, 1).day_of_week(), 4);
        // 2024-02-29 was a Thursday, day 60 of a leap year.
        let leap = IsoDate::new_unchecked(2024, 2, 29);
        assert_eq!(leap.day_of_week(), 4);
        assert_eq!(leap.day_of_year(), 60);
    }

    #[test]
    fn constrain_clamps_day_into_month() {
        let date = IsoDate::new_with_overflow(2001, 2, 31, ArithmeticOverflow::Constrain).unwrap();
        assert_eq!(date, IsoDate::new_unchecked(2001, 2, 28));
        assert!(IsoDate::new_with_overflow(2001, 2, 31, ArithmeticOverflow::Reject).is_err());
    }

    #[test]
    fn date_diff_year_boundaries() {
        let one = IsoDate::new_unchecked(2000, 5, 2);
        let two = IsoDate::new_unchecked(2001, 6, 1);
        let diff = one.diff(two, Unit::Year).unwrap();
        assert_eq!((diff.years, diff.months, diff.days), (1, 0, 30));

        let diff = one.diff(two, Unit::Month).unwrap();
        assert_eq!((diff.years, diff.months, diff.days), (0, 12, 30));

        let reverse = two.diff(one, Unit::Year).unwrap();
        assert_eq!((reverse.years, reverse.months, reverse.days), (-1, 0, -30));
    }

    #[test]
    fn date_diff_end_of_month() {
        // Jan 31 to Feb 28: not a whole month.
        let one = IsoDate::new_unchecked(2001, 1, 31);
        let two = IsoDate::new_unchecked(2001, 2, 28);
        let diff = one.diff(two, Unit::Month).unwrap();
        assert_eq!((diff.years, diff.months, diff.days), (0, 0, 28));

        // Jan 31 to Mar 31 is exactly two months.
        let three = IsoDate::new_unchecked(2001, 3, 31);
        let diff = one.diff(three, Unit::Month).unwrap();
        assert_eq!((diff.years, diff.months, diff.days), (0, 2, 0));
    }

    #[test]
    fn week_diff() {
        let one = IsoDate::new_unchecked(2020, 1, 1);
        let two = IsoDate::new_unchecked(2020, 1, 18);
        let diff = one.diff(two, Unit::Week).unwrap();
        assert_eq!((diff.weeks, diff.days), (2, 3));
    }

    #[test]
    fn time_balance_wraps_midnight() {
        let (days, time) = IsoTime::balance(25, 0, 0, 0, 0, 0);
        assert_eq!(days, 1);
        assert_eq!(time.hour, 1);

        let (days, time) = IsoTime::balance(0, 0, -1, 0, 0, 0);
        assert_eq!(days, -1);
        assert_eq!((time.hour, time.minute, time.second), (23, 59, 59));
    }

    #[test]
    fn time_round_to_microsecond_truncates() {
        let time = IsoTime::new_unchecked(12, 34, 56, 987, 654, 321);
        let options = ResolvedRoundingOptions {
            largest_unit: Unit::Microsecond,
            smallest_unit: Unit::Microsecond,
            increment: RoundingIncrement::ONE,
            rounding_mode: RoundingMode::Trunc,
        };
        let (days, rounded) = time.round(options).unwrap();
        assert_eq!(days, 0);
        assert_eq!(rounded, IsoTime::new_unchecked(12, 34, 56, 987, 654, 0));
    }

    #[test]
    fn time_round_carries_into_day() {
        let time = IsoTime::new_unchecked(23, 59, 59, 999, 999, 999);
        let options = ResolvedRoundingOptions {
            largest_unit: Unit::Second,
            smallest_unit: Unit::Second,
            increment: RoundingIncrement::ONE,
            rounding_mode: RoundingMode::HalfExpand,
        };
        let (days, rounded) = time.round(options).unwrap();
        assert_eq!(days, 1);
        assert_eq!(rounded, IsoTime::default());
    }

    #[test]
    fn datetime_epoch_nanoseconds() {
        let dt = IsoDateTime::new_unchecked(
            IsoDate::new_unchecked(1970, 1, 2),
            IsoTime::new_unchecked(0, 0, 1, 0, 0, 1),
        );
        assert_eq!(dt.utc_epoch_nanoseconds(), 86_401_000_000_001);
        assert_eq!(IsoDateTime::from_epoch_nanoseconds(86_401_000_000_001), dt);
    }
}
