//! The [`PlainTime`] wall-clock type.

use alloc::string::String;
use core::str::FromStr;

use crate::{
    duration::{DateDuration, Duration, NormalizedDurationRecord, NormalizedTimeDuration},
    iso::IsoTime,
    options::{
        ArithmeticOverflow, DifferenceOperation, DifferenceSettings, Precision,
        ResolvedRoundingOptions, RoundingOptions, ToStringRoundingOptions, UnitGroup, Unit,
    },
    parsers::{self, IsoStringBuilder, TimeRecord},
    TemporaError, TemporaResult, TemporaUnwrap,
};

/// A wall-clock time with no date, calendar, or time zone attached.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlainTime {
    time: IsoTime,
}

/// A wall-clock time where every field is optional.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PartialTime {
    /// The hour.
    pub hour: Option<u8>,
    /// The minute.
    pub minute: Option<u8>,
    /// The second.
    pub second: Option<u8>,
    /// The millisecond.
    pub millisecond: Option<u16>,
    /// The microsecond.
    pub microsecond: Option<u16>,
    /// The nanosecond.
    pub nanosecond: Option<u16>,
}

impl PartialTime {
    /// Whether no field has been set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl PlainTime {
    pub(crate) const fn new_unchecked(time: IsoTime) -> Self {
        Self { time }
    }

    /// Creates a time, rejecting out-of-range fields.
    pub fn try_new(
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
    ) -> TemporaResult<Self> {
        let time = IsoTime::new_with_overflow(
            i32::from(hour),
            i32::from(minute),
            i32::from(second),
            i32::from(millisecond),
            i32::from(microsecond),
            i32::from(nanosecond),
            ArithmeticOverflow::Reject,
        )?;
        Ok(Self::new_unchecked(time))
    }

    /// Creates a time, regulating out-of-range fields per the overflow
    /// behavior.
    pub fn new_with_overflow(
        hour: i32,
        minute: i32,
        second: i32,
        millisecond: i32,
        microsecond: i32,
        nanosecond: i32,
        overflow: ArithmeticOverflow,
    ) -> TemporaResult<Self> {
        let time = IsoTime::new_with_overflow(
            hour, minute, second, millisecond, microsecond, nanosecond, overflow,
        )?;
        Ok(Self::new_unchecked(time))
    }

    /// Creates a time from a partial, treating unset fields as zero.
    pub fn from_partial(
        partial: PartialTime,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        if partial.is_empty() {
            return Err(TemporaError::r#type()
                .with_message("a partial time must set at least one field"));
        }
        Self::new_with_overflow(
            i32::from(partial.hour.unwrap_or(0)),
            i32::from(partial.minute.unwrap_or(0)),
            i32::from(partial.second.unwrap_or(0)),
            i32::from(partial.millisecond.unwrap_or(0)),
            i32::from(partial.microsecond.unwrap_or(0)),
            i32::from(partial.nanosecond.unwrap_or(0)),
            overflow.unwrap_or_default(),
        )
    }

    pub(crate) fn iso(&self) -> IsoTime {
        self.time
    }

    // field getters

    /// The hour.
    pub fn hour(&self) -> u8 {
        self.time.hour
    }

    /// The minute.
    pub fn minute(&self) -> u8 {
        self.time.minute
    }

    /// The second.
    pub fn second(&self) -> u8 {
        self.time.second
    }

    /// The millisecond.
    pub fn millisecond(&self) -> u16 {
        self.time.millisecond
    }

    /// The microsecond.
    pub fn microsecond(&self) -> u16 {
        self.time.microsecond
    }

    /// The nanosecond.
    pub fn nanosecond(&self) -> u16 {
        self.time.nanosecond
    }

    /// This time with the set fields of the partial replaced.
    pub fn with(
        &self,
        partial: PartialTime,
        overflow: Option<ArithmeticOverflow>,
    ) -> TemporaResult<Self> {
        if partial.is_empty() {
            return Err(TemporaError::r#type()
                .with_message("a partial time must set at least one field"));
        }
        Self::new_with_overflow(
            i32::from(partial.hour.unwrap_or(self.time.hour)),
            i32::from(partial.minute.unwrap_or(self.time.minute)),
            i32::from(partial.second.unwrap_or(self.time.second)),
            i32::from(partial.millisecond.unwrap_or(self.time.millisecond)),
            i32::from(partial.microsecond.unwrap_or(self.time.microsecond)),
            i32::from(partial.nanosecond.unwrap_or(self.time.nanosecond)),
            overflow.unwrap_or_default(),
        )
    }

    /// Adds the clock portion of a duration, wrapping within the day.
    /// The calendar portion is ignored.
    pub fn add(&self, duration: &Duration) -> TemporaResult<Self> {
        let norm = duration.time().to_normalized()?;
        let (_, time) = self.time.add(norm);
        Ok(Self::new_unchecked(time))
    }

    /// Subtracts a duration; the negation of [`Self::add`].
    pub fn subtract(&self, duration: &Duration) -> TemporaResult<Self> {
        self.add(&duration.negated())
    }

    /// The duration from this time to `other`, in units of an hour or
    /// smaller.
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporaResult<Duration> {
        self.diff(DifferenceOperation::Until, other, settings)
    }

    /// The duration from `other` to this time.
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporaResult<Duration> {
        self.diff(DifferenceOperation::Since, other, settings)
    }

    fn diff(
        &self,
        op: DifferenceOperation,
        other: &Self,
        settings: DifferenceSettings,
    ) -> TemporaResult<Duration> {
        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            op,
            UnitGroup::Time,
            Unit::Hour,
            Unit::Nanosecond,
        )?;
        let diff = NormalizedTimeDuration::from_nanoseconds(i128::from(
            self.time.diff(other.time),
        ))?;
        let rounded = if resolved.is_noop() {
            diff.0
        } else {
            let length = resolved.smallest_unit.as_nanoseconds().tempora_unwrap()?;
            let step = core::num::NonZeroU128::new(
                u128::from(length) * u128::from(resolved.increment.get()),
            )
            .tempora_unwrap()?;
            diff.round_to_increment(step, resolved.rounding_mode)?
        };
        let record = NormalizedDurationRecord::new(
            DateDuration::default(),
            NormalizedTimeDuration::from_nanoseconds(rounded)?,
        )?;
        let result = Duration::from_normalized(record, resolved.largest_unit)?;
        Ok(match op {
            DifferenceOperation::Until => result,
            DifferenceOperation::Since => result.negated(),
        })
    }

    /// Rounds to the given increment of a time unit.
    pub fn round(&self, options: RoundingOptions) -> TemporaResult<Self> {
        let resolved = ResolvedRoundingOptions::from_time_options(options)?;
        let (_, time) = self.time.round(resolved)?;
        Ok(Self::new_unchecked(time))
    }

    /// Renders per the provided seconds precision.
    pub fn to_ixdtf_string(&self, options: ToStringRoundingOptions) -> TemporaResult<String> {
        let resolved = options.resolve()?;
        let rounding = ResolvedRoundingOptions {
            largest_unit: resolved.smallest_unit,
            smallest_unit: resolved.smallest_unit,
            increment: resolved.increment,
            rounding_mode: resolved.rounding_mode,
        };
        // The day carry is dropped; a time at the end of the day wraps.
        let (_, time) = self.time.round(rounding)?;
        Ok(IsoStringBuilder::default()
            .with_time(time, resolved.precision)
            .build())
    }
}

impl From<TimeRecord> for PlainTime {
    fn from(record: TimeRecord) -> Self {
        Self::new_unchecked(IsoTime::new_unchecked(
            record.hour,
            record.minute,
            record.second,
            (record.nanosecond / 1_000_000) as u16,
            (record.nanosecond / 1_000 % 1_000) as u16,
            (record.nanosecond % 1_000) as u16,
        ))
    }
}

impl FromStr for PlainTime {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = parsers::parse_time(s)?;
        let record = parsed.time.ok_or_else(|| {
            TemporaError::range().with_message("string does not contain a time")
        })?;
        Ok(Self::from(record))
    }
}

impl core::fmt::Display for PlainTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(
            &IsoStringBuilder::default()
                .with_time(self.time, Precision::Auto)
                .build(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{RoundingMode, Unit};
    use alloc::string::ToString;

    #[test]
    fn construction_bounds() {
        assert!(PlainTime::try_new(23, 59, 59, 999, 999, 999).is_ok());
        assert!(PlainTime::try_new(24, 0, 0, 0, 0, 0).is_err());
        let clamped = PlainTime::new_with_overflow(
            25, 61, 61, 1000, 1000, 1000, ArithmeticOverflow::Constrain,
        )
        .unwrap();
        assert_eq!(clamped, PlainTime::try_new(23, 59, 59, 999, 999, 999).unwrap());
    }

    #[test]
    fn add_wraps_within_the_day() {
        let time = PlainTime::try_new(23, 0, 0, 0, 0, 0).unwrap();
        let later = time
            .add(&Duration::new(0, 0, 0, 0, 2, 0, 0, 0, 0, 0).unwrap())
            .unwrap();
        assert_eq!(later, PlainTime::try_new(1, 0, 0, 0, 0, 0).unwrap());

        let earlier = time
            .subtract(&Duration::new(0, 0, 0, 0, 24, 0, 0, 0, 0, 0).unwrap())
            .unwrap();
        assert_eq!(earlier, time);
    }

    #[test]
    fn until_balances_to_hours() {
        let a = PlainTime::try_new(1, 0, 0, 0, 0, 0).unwrap();
        let b = PlainTime::try_new(3, 30, 0, 0, 0, 0).unwrap();
        let until = a.until(&b, DifferenceSettings::default()).unwrap();
        assert_eq!((until.hours(), until.minutes()), (2, 30));
        let since = a.since(&b, DifferenceSettings::default()).unwrap();
        assert_eq!((since.hours(), since.minutes()), (-2, -30));
    }

    #[test]
    fn round_to_microsecond_truncates() {
        let time = PlainTime::try_new(12, 34, 56, 987, 654, 321).unwrap();
        for mode in [RoundingMode::Trunc, RoundingMode::Floor] {
            let rounded = time
                .round(RoundingOptions {
                    smallest_unit: Some(Unit::Microsecond),
                    rounding_mode: Some(mode),
                    ..Default::default()
                })
                .unwrap();
            assert_eq!(rounded.to_string(), "12:34:56.987654");
        }
    }

    #[test]
    fn round_to_nanosecond_is_identity() {
        let time = PlainTime::try_new(12, 34, 56, 987, 654, 321).unwrap();
        let rounded = time
            .round(RoundingOptions {
                smallest_unit: Some(Unit::Nanosecond),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(rounded, time);
    }

    #[test]
    fn parse_and_format_round_trip() {
        let time = PlainTime::from_str("12:34:56.5").unwrap();
        assert_eq!(time.to_string(), "12:34:56.5");
        assert_eq!(PlainTime::from_str("T0130").unwrap().to_string(), "01:30:00");

        // A leap second clamps.
        let leap = PlainTime::from_str("23:59:60").unwrap();
        assert_eq!(leap.to_string(), "23:59:59.999999999");

        // Strings that read as a date form are ambiguous without T.
        assert!(PlainTime::from_str("1214").is_err());
        assert!(PlainTime::from_str("T1214").is_ok());
    }

    #[test]
    fn with_replaces_set_fields() {
        let time = PlainTime::try_new(1, 2, 3, 4, 5, 6).unwrap();
        let replaced = time
            .with(
                PartialTime {
                    minute: Some(30),
                    ..Default::default()
                },
                None,
            )
            .unwrap();
        assert_eq!(replaced, PlainTime::try_new(1, 30, 3, 4, 5, 6).unwrap());
        assert!(time.with(PartialTime::default(), None).is_err());
    }
}
