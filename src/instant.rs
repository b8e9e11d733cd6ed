//! The [`Instant`] exact-time type.

use alloc::string::String;
use core::{num::NonZeroU128, str::FromStr};

use crate::{
    duration::{
        DateDuration, Duration, NormalizedDurationRecord, NormalizedTimeDuration,
    },
    epoch_ns::EpochNanoseconds,
    iso::IsoDateTime,
    options::{
        DifferenceOperation, DifferenceSettings, DisplayOffset, ResolvedRoundingOptions,
        RoundingMode, RoundingOptions, ToStringRoundingOptions, Unit, UnitGroup,
        UnsignedRoundingMode,
    },
    parsers::{self, IsoStringBuilder, UtcOffsetRecordOrZ},
    plain_time::PlainTime,
    TemporaError, TemporaResult, TemporaUnwrap,
};

/// An exact point on the UTC timeline, independent of calendar and
/// time zone.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(EpochNanoseconds);

impl Instant {
    /// Creates an instant from a nanosecond count since the Unix epoch.
    pub fn try_new(epoch_nanoseconds: i128) -> TemporaResult<Self> {
        Ok(Self(EpochNanoseconds::try_from(epoch_nanoseconds)?))
    }

    /// Creates an instant from a millisecond count since the Unix
    /// epoch.
    pub fn from_epoch_milliseconds(epoch_milliseconds: i64) -> TemporaResult<Self> {
        Self::try_new(i128::from(epoch_milliseconds) * 1_000_000)
    }

    /// Creates an instant from a second count since the Unix epoch.
    pub fn from_epoch_seconds(epoch_seconds: i64) -> TemporaResult<Self> {
        Self::try_new(i128::from(epoch_seconds) * 1_000_000_000)
    }

    /// The nanosecond count since the Unix epoch.
    #[must_use]
    pub fn epoch_nanoseconds(&self) -> EpochNanoseconds {
        self.0
    }

    /// The nanosecond count since the Unix epoch as a plain integer.
    #[must_use]
    pub fn as_i128(&self) -> i128 {
        self.0.as_i128()
    }

    /// The microsecond count since the Unix epoch, truncated toward
    /// negative infinity.
    #[must_use]
    pub fn epoch_microseconds(&self) -> i128 {
        self.0.as_i128().div_euclid(1_000)
    }

    /// The millisecond count since the Unix epoch, truncated toward
    /// negative infinity.
    #[must_use]
    pub fn epoch_milliseconds(&self) -> i64 {
        self.0.as_i128().div_euclid(1_000_000) as i64
    }

    /// The second count since the Unix epoch, truncated toward negative
    /// infinity.
    #[must_use]
    pub fn epoch_seconds(&self) -> i64 {
        self.0.as_i128().div_euclid(1_000_000_000) as i64
    }

    /// Adds a duration. Calendar and day fields are rejected; an
    /// instant has no calendar or day length to resolve them against.
    pub fn add(&self, duration: &Duration) -> TemporaResult<Self> {
        if duration.date().sign() != crate::Sign::Zero {
            return Err(TemporaError::range()
                .with_message("an exact-time duration cannot carry date fields"));
        }
        let norm = duration.time().to_normalized()?;
        Ok(Self(self.0.checked_add(norm.0)?))
    }

    /// Subtracts a duration; the negation of [`Self::add`].
    pub fn subtract(&self, duration: &Duration) -> TemporaResult<Self> {
        self.add(&duration.negated())
    }

    /// The duration from this instant to `other`, in units of an hour
    /// or smaller.
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporaResult<Duration> {
        self.diff(DifferenceOperation::Until, other, settings)
    }

    /// The duration from `other` to this instant.
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
            Unit::Second,
            Unit::Nanosecond,
        )?;
        let diff = NormalizedTimeDuration::from_nanoseconds(
            other.0.as_i128() - self.0.as_i128(),
        )?;
        let rounded = if resolved.is_noop() {
            diff.0
        } else {
            let length = resolved.smallest_unit.as_nanoseconds().tempora_unwrap()?;
            let step = NonZeroU128::new(
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

    /// Rounds to an increment of a time unit. The increment must divide
    /// a day evenly.
    pub fn round(&self, options: RoundingOptions) -> TemporaResult<Self> {
        let resolved = ResolvedRoundingOptions::from_instant_options(options)?;
        let length = resolved.smallest_unit.as_nanoseconds().tempora_unwrap()?;
        let step = NonZeroU128::new(u128::from(length) * u128::from(resolved.increment.get()))
            .tempora_unwrap()?;
        let rounded = round_epoch_ns(self.0.as_i128(), step, resolved.rounding_mode);
        Self::try_new(rounded)
    }

    /// Renders in UTC with the `Z` designator, per the provided seconds
    /// precision.
    pub fn to_ixdtf_string(&self, options: ToStringRoundingOptions) -> TemporaResult<String> {
        let resolved = options.resolve()?;
        let length = resolved.smallest_unit.as_nanoseconds().tempora_unwrap()?;
        let step = NonZeroU128::new(u128::from(length) * u128::from(resolved.increment.get()))
            .tempora_unwrap()?;
        let rounded = round_epoch_ns(self.0.as_i128(), step, resolved.rounding_mode);
        EpochNanoseconds::try_from(rounded)?;
        let iso = IsoDateTime::from_epoch_nanoseconds(rounded);
        Ok(IsoStringBuilder::default()
            .with_date(iso.date)
            .with_time(iso.time, resolved.precision)
            .with_z(DisplayOffset::Auto)
            .build())
    }
}

/// Rounds an epoch nanosecond count to a multiple of the step,
/// reading the mode as if the count were positive. An epoch value is a
/// position, not a magnitude, so `trunc` means earlier, not closer to
/// the epoch.
pub(crate) fn round_epoch_ns(nanos: i128, step: NonZeroU128, mode: RoundingMode) -> i128 {
    let step = step.get() as i128;
    let floor = nanos.div_euclid(step) * step;
    let remainder = nanos - floor;
    if remainder == 0 {
        return floor;
    }
    let ceil = floor + step;
    match mode.get_unsigned_round_mode(true) {
        UnsignedRoundingMode::Zero => floor,
        UnsignedRoundingMode::Infinity => ceil,
        half => match (remainder * 2).cmp(&step) {
            core::cmp::Ordering::Less => floor,
            core::cmp::Ordering::Greater => ceil,
            core::cmp::Ordering::Equal => match half {
                UnsignedRoundingMode::HalfZero => floor,
                UnsignedRoundingMode::HalfInfinity => ceil,
                _ if (floor / step) % 2 == 0 => floor,
                _ => ceil,
            },
        },
    }
}

impl From<EpochNanoseconds> for Instant {
    fn from(epoch: EpochNanoseconds) -> Self {
        Self(epoch)
    }
}

impl FromStr for Instant {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = parsers::parse_instant(s)?;
        let (date, time, offset) = match (parsed.date, parsed.time, parsed.offset) {
            (Some(date), Some(time), Some(offset)) => (date, time, offset),
            _ => {
                return Err(TemporaError::range()
                    .with_message("an exact-time string requires a date, time, and offset"))
            }
        };
        let offset_ns = match offset {
            UtcOffsetRecordOrZ::Z => 0,
            UtcOffsetRecordOrZ::Offset(record) => record.to_nanoseconds(),
        };
        let civil = crate::iso::utc_epoch_nanos(
            crate::iso::IsoDate::new_unchecked(date.year, date.month, date.day),
            PlainTime::from(time).iso(),
        );
        Self::try_new(civil - i128::from(offset_ns))
    }
}

impl core::fmt::Display for Instant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let iso = IsoDateTime::from_epoch_nanoseconds(self.0.as_i128());
        f.write_str(
            &IsoStringBuilder::default()
                .with_date(iso.date)
                .with_time(iso.time, crate::options::Precision::Auto)
                .with_z(DisplayOffset::Auto)
                .build(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use crate::{NS_MAX_INSTANT, NS_MIN_INSTANT};

    #[test]
    fn range_limits() {
        assert!(Instant::try_new(NS_MAX_INSTANT).is_ok());
        assert!(Instant::try_new(NS_MAX_INSTANT + 1).is_err());
        assert!(Instant::try_new(NS_MIN_INSTANT).is_ok());
        assert!(Instant::try_new(NS_MIN_INSTANT - 1).is_err());
    }

    #[test]
    fn epoch_getters_floor_toward_negative_infinity() {
        let instant = Instant::try_new(-1).unwrap();
        assert_eq!(instant.epoch_milliseconds(), -1);
        assert_eq!(instant.epoch_seconds(), -1);
        let positive = Instant::try_new(1_500_000_000).unwrap();
        assert_eq!(positive.epoch_milliseconds(), 1_500);
        assert_eq!(positive.epoch_seconds(), 1);
    }

    #[test]
    fn add_rejects_date_fields() {
        let instant = Instant::try_new(0).unwrap();
        let hour = Duration::new(0, 0, 0, 0, 1, 0, 0, 0, 0, 0).unwrap();
        assert_eq!(
            instant.add(&hour).unwrap().as_i128(),
            3_600_000_000_000
        );
        let day = Duration::new(0, 0, 0, 1, 0, 0, 0, 0, 0, 0).unwrap();
        assert!(instant.add(&day).is_err());
    }

    #[test]
    fn until_defaults_to_seconds() {
        let a = Instant::try_new(0).unwrap();
        let b = Instant::try_new(90_500_000_000).unwrap();
        let until = a.until(&b, DifferenceSettings::default()).unwrap();
        assert_eq!(until.seconds(), 90);
        assert_eq!(until.milliseconds(), 500);
        let hours = a
            .until(
                &b,
                DifferenceSettings {
                    largest_unit: Some(Unit::Minute),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!((hours.minutes(), hours.seconds()), (1, 30));
    }

    #[test]
    fn round_reads_the_mode_as_if_positive() {
        // 1969-12-31T23:59:59.5Z
        let instant = Instant::try_new(-500_000_000).unwrap();
        let rounded = instant
            .round(RoundingOptions {
                smallest_unit: Some(Unit::Second),
                rounding_mode: Some(RoundingMode::Trunc),
                ..Default::default()
            })
            .unwrap();
        // Trunc moves earlier, not toward the epoch.
        assert_eq!(rounded.as_i128(), -1_000_000_000);
    }

    #[test]
    fn parse_applies_the_offset() {
        let zulu = Instant::from_str("1970-01-01T00:00:01Z").unwrap();
        assert_eq!(zulu.as_i128(), 1_000_000_000);
        let offset = Instant::from_str("1970-01-01T01:00:00+01:00").unwrap();
        assert_eq!(offset.as_i128(), 0);
        // An offset or Z is required for exact time.
        assert!(Instant::from_str("1970-01-01T00:00:00").is_err());
        assert_eq!(offset.to_string(), "1970-01-01T00:00:00Z");
    }
}
