//! Option types governing arithmetic, rounding, disambiguation, and
//! string output.
//!
//! Operations accept user-facing option bags ([`RoundingOptions`],
//! [`DifferenceSettings`], [`ToStringRoundingOptions`]) and internally
//! resolve them into fully-validated records before any arithmetic
//! runs, so a bad combination of options fails before it can observe
//! partial work.

use crate::{TemporaError, TemporaResult};
use core::{fmt, num::NonZeroU32, str::FromStr};

// ==== Unit ====

/// The unit of a duration field or rounding operation.
///
/// The ordering follows magnitude: `Nanosecond` is the smallest unit
/// and `Year` the largest, with `Auto` below all of them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Unit {
    /// The auto unit, resolved per operation.
    #[default]
    Auto = 0,
    /// The nanosecond unit.
    Nanosecond,
    /// The microsecond unit.
    Microsecond,
    /// The millisecond unit.
    Millisecond,
    /// The second unit.
    Second,
    /// The minute unit.
    Minute,
    /// The hour unit.
    Hour,
    /// The day unit.
    Day,
    /// The week unit.
    Week,
    /// The month unit.
    Month,
    /// The year unit.
    Year,
}

impl Unit {
    /// Returns whether this unit is a calendar unit (year, month, or
    /// week), whose length depends on a reference point.
    #[inline]
    #[must_use]
    pub fn is_calendar_unit(self) -> bool {
        matches!(self, Self::Year | Self::Month | Self::Week)
    }

    /// Returns whether this unit is a date unit.
    #[inline]
    #[must_use]
    pub fn is_date_unit(self) -> bool {
        matches!(self, Self::Year | Self::Month | Self::Week | Self::Day)
    }

    /// Returns whether this unit is a time unit.
    #[inline]
    #[must_use]
    pub fn is_time_unit(self) -> bool {
        matches!(
            self,
            Self::Hour
                | Self::Minute
                | Self::Second
                | Self::Millisecond
                | Self::Microsecond
                | Self::Nanosecond
        )
    }

    /// Returns the larger of two units, rejecting `Auto`.
    pub(crate) fn larger(self, other: Self) -> TemporaResult<Self> {
        if self == Self::Auto || other == Self::Auto {
            return Err(TemporaError::range().with_message("auto cannot be compared as a unit"));
        }
        Ok(self.max(other))
    }

    /// Returns the length of this unit in nanoseconds, if it has a
    /// fixed length.
    pub(crate) fn as_nanoseconds(self) -> Option<u64> {
        match self {
            Self::Day => Some(86_400_000_000_000),
            Self::Hour => Some(3_600_000_000_000),
            Self::Minute => Some(60_000_000_000),
            Self::Second => Some(1_000_000_000),
            Self::Millisecond => Some(1_000_000),
            Self::Microsecond => Some(1_000),
            Self::Nanosecond => Some(1),
            _ => None,
        }
    }

    /// Returns the maximum rounding increment dividend for this unit
    /// when rounding a duration field, or `None` when any positive
    /// increment is allowed.
    pub(crate) fn to_maximum_rounding_increment(self) -> Option<u32> {
        match self {
            Self::Hour => Some(24),
            Self::Minute | Self::Second => Some(60),
            Self::Millisecond | Self::Microsecond | Self::Nanosecond => Some(1000),
            _ => None,
        }
    }
}

impl FromStr for Unit {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "year" | "years" => Ok(Self::Year),
            "month" | "months" => Ok(Self::Month),
            "week" | "weeks" => Ok(Self::Week),
            "day" | "days" => Ok(Self::Day),
            "hour" | "hours" => Ok(Self::Hour),
            "minute" | "minutes" => Ok(Self::Minute),
            "second" | "seconds" => Ok(Self::Second),
            "millisecond" | "milliseconds" => Ok(Self::Millisecond),
            "microsecond" | "microseconds" => Ok(Self::Microsecond),
            "nanosecond" | "nanoseconds" => Ok(Self::Nanosecond),
            _ => Err(TemporaError::range().with_message("provided string was not a valid unit")),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => "auto",
            Self::Year => "year",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Millisecond => "millisecond",
            Self::Microsecond => "microsecond",
            Self::Nanosecond => "nanosecond",
        }
        .fmt(f)
    }
}

/// The set of units an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnitGroup {
    /// Year through day.
    Date,
    /// Hour through nanosecond.
    Time,
    /// Year through nanosecond.
    DateTime,
}

impl UnitGroup {
    pub(crate) fn validate_unit(self, unit: Unit) -> TemporaResult<()> {
        let valid = match self {
            Self::Date => unit.is_date_unit(),
            Self::Time => unit.is_time_unit(),
            Self::DateTime => unit != Unit::Auto,
        };
        if !valid {
            return Err(
                TemporaError::range().with_message("unit is not valid for this operation")
            );
        }
        Ok(())
    }
}

// ==== Overflow and disambiguation behavior ====

/// The behavior when a civil field is outside its valid range.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOverflow {
    /// Clamp the field into range.
    #[default]
    Constrain,
    /// Raise a `RangeError`.
    Reject,
}

impl FromStr for ArithmeticOverflow {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constrain" => Ok(Self::Constrain),
            "reject" => Ok(Self::Reject),
            _ => Err(TemporaError::range()
                .with_message("provided string was not a valid overflow behavior")),
        }
    }
}

impl fmt::Display for ArithmeticOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constrain => "constrain",
            Self::Reject => "reject",
        }
        .fmt(f)
    }
}

/// The behavior when a civil timestamp is skipped or repeated by a
/// time zone transition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Disambiguation {
    /// Take the later instant in a gap and the earlier in a fold.
    #[default]
    Compatible,
    /// Take the earlier candidate.
    Earlier,
    /// Take the later candidate.
    Later,
    /// Raise a `RangeError`.
    Reject,
}

impl FromStr for Disambiguation {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compatible" => Ok(Self::Compatible),
            "earlier" => Ok(Self::Earlier),
            "later" => Ok(Self::Later),
            "reject" => Ok(Self::Reject),
            _ => Err(TemporaError::range()
                .with_message("provided string was not a valid disambiguation")),
        }
    }
}

impl fmt::Display for Disambiguation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compatible => "compatible",
            Self::Earlier => "earlier",
            Self::Later => "later",
            Self::Reject => "reject",
        }
        .fmt(f)
    }
}

/// The behavior when a parsed string carries both a UTC offset and a
/// named time zone that disagree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OffsetDisambiguation {
    /// Trust the offset.
    Use,
    /// Trust the offset when it is valid for the zone, otherwise
    /// resolve through the zone.
    #[default]
    Prefer,
    /// Ignore the offset and resolve through the zone.
    Ignore,
    /// Raise a `RangeError` on disagreement.
    Reject,
}

impl FromStr for OffsetDisambiguation {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "use" => Ok(Self::Use),
            "prefer" => Ok(Self::Prefer),
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            _ => Err(TemporaError::range()
                .with_message("provided string was not a valid offset behavior")),
        }
    }
}

impl fmt::Display for OffsetDisambiguation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Use => "use",
            Self::Prefer => "prefer",
            Self::Ignore => "ignore",
            Self::Reject => "reject",
        }
        .fmt(f)
    }
}

// ==== Rounding modes ====

/// The nine supported rounding modes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round toward positive infinity.
    Ceil,
    /// Round toward negative infinity.
    Floor,
    /// Round away from zero.
    Expand,
    /// Round toward zero.
    Trunc,
    /// Round to nearest, ties toward positive infinity.
    HalfCeil,
    /// Round to nearest, ties toward negative infinity.
    HalfFloor,
    /// Round to nearest, ties away from zero.
    #[default]
    HalfExpand,
    /// Round to nearest, ties toward zero.
    HalfTrunc,
    /// Round to nearest, ties to the even multiple.
    HalfEven,
}

/// A rounding mode reduced over the sign of the rounded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnsignedRoundingMode {
    Infinity,
    Zero,
    HalfInfinity,
    HalfZero,
    HalfEven,
}

impl RoundingMode {
    /// Returns the negated mode: directional modes flip, symmetric
    /// modes are unchanged.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Ceil => Self::Floor,
            Self::Floor => Self::Ceil,
            Self::HalfCeil => Self::HalfFloor,
            Self::HalfFloor => Self::HalfCeil,
            _ => self,
        }
    }

    /// Reduces this mode over the sign of the value being rounded.
    pub(crate) fn get_unsigned_round_mode(self, is_positive: bool) -> UnsignedRoundingMode {
        match self {
            Self::Ceil if is_positive => UnsignedRoundingMode::Infinity,
            Self::Ceil => UnsignedRoundingMode::Zero,
            Self::Floor if is_positive => UnsignedRoundingMode::Zero,
            Self::Floor | Self::Expand => UnsignedRoundingMode::Infinity,
            Self::Trunc => UnsignedRoundingMode::Zero,
            Self::HalfCeil if is_positive => UnsignedRoundingMode::HalfInfinity,
            Self::HalfCeil => UnsignedRoundingMode::HalfZero,
            Self::HalfFloor if is_positive => UnsignedRoundingMode::HalfZero,
            Self::HalfFloor | Self::HalfExpand => UnsignedRoundingMode::HalfInfinity,
            Self::HalfTrunc => UnsignedRoundingMode::HalfZero,
            Self::HalfEven => UnsignedRoundingMode::HalfEven,
        }
    }
}

impl FromStr for RoundingMode {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ceil" => Ok(Self::Ceil),
            "floor" => Ok(Self::Floor),
            "expand" => Ok(Self::Expand),
            "trunc" => Ok(Self::Trunc),
            "halfCeil" => Ok(Self::HalfCeil),
            "halfFloor" => Ok(Self::HalfFloor),
            "halfExpand" => Ok(Self::HalfExpand),
            "halfTrunc" => Ok(Self::HalfTrunc),
            "halfEven" => Ok(Self::HalfEven),
            _ => Err(TemporaError::range()
                .with_message("provided string was not a valid rounding mode")),
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ceil => "ceil",
            Self::Floor => "floor",
            Self::Expand => "expand",
            Self::Trunc => "trunc",
            Self::HalfCeil => "halfCeil",
            Self::HalfFloor => "halfFloor",
            Self::HalfExpand => "halfExpand",
            Self::HalfTrunc => "halfTrunc",
            Self::HalfEven => "halfEven",
        }
        .fmt(f)
    }
}

// ==== Rounding increment ====

/// A positive rounding increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundingIncrement(pub(crate) NonZeroU32);

impl Default for RoundingIncrement {
    fn default() -> Self {
        Self::ONE
    }
}

impl RoundingIncrement {
    /// An increment of one.
    pub const ONE: Self = Self(match NonZeroU32::new(1) {
        Some(one) => one,
        None => unreachable!(),
    });

    /// Creates an increment, rejecting zero.
    pub fn try_new(increment: u32) -> TemporaResult<Self> {
        NonZeroU32::new(increment).map(Self).ok_or_else(|| {
            TemporaError::range().with_message("rounding increment must be positive")
        })
    }

    /// Returns the increment value.
    #[inline]
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Validates this increment against a dividend: the increment must
    /// divide the dividend evenly and must not exceed it (or must be
    /// strictly smaller, when `inclusive` is false).
    pub(crate) fn validate(self, dividend: u64, inclusive: bool) -> TemporaResult<()> {
        let max = if inclusive { dividend } else { dividend - 1 };
        let increment = u64::from(self.get());
        if increment > max || dividend % increment != 0 {
            return Err(TemporaError::range()
                .with_message("rounding increment does not evenly divide the unit range"));
        }
        Ok(())
    }
}

// ==== User-facing option bags ====

/// Options for the `round` family of operations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoundingOptions {
    /// The largest unit of the result.
    pub largest_unit: Option<Unit>,
    /// The unit to round to.
    pub smallest_unit: Option<Unit>,
    /// The rounding mode to apply.
    pub rounding_mode: Option<RoundingMode>,
    /// The multiple of the smallest unit to round to.
    pub increment: Option<RoundingIncrement>,
}

/// Options for the `until`/`since` family of operations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DifferenceSettings {
    /// The largest unit of the result.
    pub largest_unit: Option<Unit>,
    /// The unit to round the result to.
    pub smallest_unit: Option<Unit>,
    /// The rounding mode to apply.
    pub rounding_mode: Option<RoundingMode>,
    /// The multiple of the smallest unit to round to.
    pub increment: Option<RoundingIncrement>,
}

/// The direction of a difference operation.
///
/// `since` is `until` with the operands swapped, which is implemented
/// by negating the rounding mode and the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DifferenceOperation {
    Until,
    Since,
}

// ==== Resolved rounding options ====

/// Fully validated rounding options, produced from a user-facing bag
/// before any arithmetic runs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedRoundingOptions {
    pub(crate) largest_unit: Unit,
    pub(crate) smallest_unit: Unit,
    pub(crate) increment: RoundingIncrement,
    pub(crate) rounding_mode: RoundingMode,
}

impl ResolvedRoundingOptions {
    /// Resolves difference settings for an `until`/`since` operation.
    ///
    /// `since` negates the rounding mode so the rounding is performed
    /// relative to the receiver; the caller negates the result.
    pub(crate) fn from_diff_settings(
        settings: DifferenceSettings,
        operation: DifferenceOperation,
        group: UnitGroup,
        fallback_largest: Unit,
        fallback_smallest: Unit,
    ) -> TemporaResult<Self> {
        let smallest_unit = settings.smallest_unit.unwrap_or(fallback_smallest);
        group.validate_unit(smallest_unit)?;

        let default_largest = fallback_largest.larger(smallest_unit)?;
        let largest_unit = match settings.largest_unit {
            None | Some(Unit::Auto) => default_largest,
            Some(unit) => {
                group.validate_unit(unit)?;
                unit
            }
        };
        if largest_unit.larger(smallest_unit)? != largest_unit {
            return Err(TemporaError::range()
                .with_message("smallestUnit is larger than largestUnit"));
        }

        let increment = settings.increment.unwrap_or_default();
        if let Some(max) = smallest_unit.to_maximum_rounding_increment() {
            increment.validate(u64::from(max), false)?;
        }

        let mode = settings.rounding_mode.unwrap_or(RoundingMode::Trunc);
        let rounding_mode = match operation {
            DifferenceOperation::Until => mode,
            DifferenceOperation::Since => mode.negate(),
        };

        Ok(Self {
            largest_unit,
            smallest_unit,
            increment,
            rounding_mode,
        })
    }

    /// Resolves options for `Duration::round`.
    ///
    /// At least one of the two units must be present; the largest unit
    /// defaults to the larger of the duration's own largest unit and
    /// the smallest unit.
    pub(crate) fn from_duration_options(
        options: RoundingOptions,
        existing_largest: Unit,
    ) -> TemporaResult<Self> {
        if options.largest_unit.is_none() && options.smallest_unit.is_none() {
            return Err(TemporaError::range()
                .with_message("at least one of smallestUnit or largestUnit is required"));
        }

        let smallest_unit = options.smallest_unit.unwrap_or(Unit::Nanosecond);
        UnitGroup::DateTime.validate_unit(smallest_unit)?;

        let default_largest = existing_largest.larger(smallest_unit)?;
        let largest_unit = match options.largest_unit {
            None | Some(Unit::Auto) => default_largest,
            Some(unit) => {
                UnitGroup::DateTime.validate_unit(unit)?;
                unit
            }
        };
        if largest_unit.larger(smallest_unit)? != largest_unit {
            return Err(TemporaError::range()
                .with_message("smallestUnit is larger than largestUnit"));
        }

        let increment = options.increment.unwrap_or_default();
        if let Some(max) = smallest_unit.to_maximum_rounding_increment() {
            increment.validate(u64::from(max), false)?;
        }

        Ok(Self {
            largest_unit,
            smallest_unit,
            increment,
            rounding_mode: options.rounding_mode.unwrap_or_default(),
        })
    }

    /// Resolves options for `round` on a civil date-time, where day is
    /// the largest permitted unit and a day increment must be exactly
    /// one.
    pub(crate) fn from_dt_options(options: RoundingOptions) -> TemporaResult<Self> {
        let smallest_unit = options.smallest_unit.ok_or_else(|| {
            TemporaError::range().with_message("smallestUnit is required for round")
        })?;
        if smallest_unit != Unit::Day {
            UnitGroup::Time.validate_unit(smallest_unit)?;
        }

        let increment = options.increment.unwrap_or_default();
        match smallest_unit.to_maximum_rounding_increment() {
            Some(max) => increment.validate(u64::from(max), false)?,
            None => increment.validate(1, true)?,
        }

        Ok(Self {
            largest_unit: smallest_unit,
            smallest_unit,
            increment,
            rounding_mode: options.rounding_mode.unwrap_or_default(),
        })
    }

    /// Resolves options for `round` on a civil time.
    pub(crate) fn from_time_options(options: RoundingOptions) -> TemporaResult<Self> {
        let smallest_unit = options.smallest_unit.ok_or_else(|| {
            TemporaError::range().with_message("smallestUnit is required for round")
        })?;
        UnitGroup::Time.validate_unit(smallest_unit)?;

        let increment = options.increment.unwrap_or_default();
        match smallest_unit.to_maximum_rounding_increment() {
            Some(max) => increment.validate(u64::from(max), false)?,
            None => increment.validate(1, true)?,
        }

        Ok(Self {
            largest_unit: smallest_unit,
            smallest_unit,
            increment,
            rounding_mode: options.rounding_mode.unwrap_or_default(),
        })
    }

    /// Resolves options for `Instant::round`, where the increment must
    /// divide evenly into one whole day of the smallest unit.
    pub(crate) fn from_instant_options(options: RoundingOptions) -> TemporaResult<Self> {
        let smallest_unit = options.smallest_unit.ok_or_else(|| {
            TemporaError::range().with_message("smallestUnit is required for round")
        })?;
        UnitGroup::Time.validate_unit(smallest_unit)?;

        let per_day = match smallest_unit {
            Unit::Hour => 24,
            Unit::Minute => 1_440,
            Unit::Second => 86_400,
            Unit::Millisecond => 86_400_000,
            Unit::Microsecond => 86_400_000_000,
            Unit::Nanosecond => 86_400_000_000_000,
            _ => {
                return Err(
                    TemporaError::range().with_message("unit is not valid for this operation")
                )
            }
        };
        let increment = options.increment.unwrap_or_default();
        increment.validate(per_day, true)?;

        Ok(Self {
            largest_unit: smallest_unit,
            smallest_unit,
            increment,
            rounding_mode: options.rounding_mode.unwrap_or_default(),
        })
    }

    pub(crate) fn is_noop(&self) -> bool {
        self.smallest_unit == Unit::Nanosecond && self.increment.get() == 1
    }
}

// ==== String output options ====

/// The number of fractional second digits to emit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Emit as many digits as needed, trimming trailing zeros.
    #[default]
    Auto,
    /// Stop at the minute, emitting no seconds at all.
    Minute,
    /// Emit exactly this many digits (0 through 9).
    Digit(u8),
}

/// Options controlling seconds precision when rendering to a string.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ToStringRoundingOptions {
    /// The fractional second precision.
    pub precision: Precision,
    /// The unit to round to before rendering.
    pub smallest_unit: Option<Unit>,
    /// The rounding mode to apply, defaulting to `trunc`.
    pub rounding_mode: Option<RoundingMode>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedToStringRoundingOptions {
    pub(crate) precision: Precision,
    pub(crate) smallest_unit: Unit,
    pub(crate) increment: RoundingIncrement,
    pub(crate) rounding_mode: RoundingMode,
}

impl ToStringRoundingOptions {
    pub(crate) fn resolve(&self) -> TemporaResult<ResolvedToStringRoundingOptions> {
        let rounding_mode = self.rounding_mode.unwrap_or(RoundingMode::Trunc);
        let (precision, smallest_unit, increment) = match self.smallest_unit {
            Some(Unit::Minute) => (Precision::Minute, Unit::Minute, 1),
            Some(Unit::Second) => (Precision::Digit(0), Unit::Second, 1),
            Some(Unit::Millisecond) => (Precision::Digit(3), Unit::Millisecond, 1),
            Some(Unit::Microsecond) => (Precision::Digit(6), Unit::Microsecond, 1),
            Some(Unit::Nanosecond) => (Precision::Digit(9), Unit::Nanosecond, 1),
            Some(_) => {
                return Err(TemporaError::range()
                    .with_message("smallestUnit is not valid for string output"))
            }
            None => match self.precision {
                Precision::Auto => (Precision::Auto, Unit::Nanosecond, 1),
                Precision::Minute => {
                    return Err(TemporaError::range()
                        .with_message("minute precision requires an explicit smallestUnit"))
                }
                Precision::Digit(0) => (Precision::Digit(0), Unit::Second, 1),
                Precision::Digit(d @ 1..=3) => {
                    (Precision::Digit(d), Unit::Millisecond, 10u32.pow(3 - u32::from(d)))
                }
                Precision::Digit(d @ 4..=6) => {
                    (Precision::Digit(d), Unit::Microsecond, 10u32.pow(6 - u32::from(d)))
                }
                Precision::Digit(d @ 7..=9) => {
                    (Precision::Digit(d), Unit::Nanosecond, 10u32.pow(9 - u32::from(d)))
                }
                Precision::Digit(_) => {
                    return Err(TemporaError::range()
                        .with_message("fractional digit precision must be 0 through 9"))
                }
            },
        };
        Ok(ResolvedToStringRoundingOptions {
            precision,
            smallest_unit,
            increment: RoundingIncrement::try_new(increment)?,
            rounding_mode,
        })
    }
}

/// Whether to include the calendar annotation when rendering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCalendar {
    /// Include the annotation for non-ISO calendars only.
    #[default]
    Auto,
    /// Always include the annotation.
    Always,
    /// Never include the annotation.
    Never,
    /// Include the annotation with the critical flag.
    Critical,
}

impl FromStr for DisplayCalendar {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "critical" => Ok(Self::Critical),
            _ => Err(TemporaError::range()
                .with_message("provided string was not a valid calendar display option")),
        }
    }
}

impl fmt::Display for DisplayCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Always => f.write_str("always"),
            Self::Never => f.write_str("never"),
            Self::Critical => f.write_str("critical"),
        }
    }
}

/// Whether to include the UTC offset when rendering a zoned date-time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOffset {
    /// Include the offset.
    #[default]
    Auto,
    /// Never include the offset.
    Never,
}

impl FromStr for DisplayOffset {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "never" => Ok(Self::Never),
            _ => Err(TemporaError::range()
                .with_message("provided string was not a valid offset display option")),
        }
    }
}

impl fmt::Display for DisplayOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Never => f.write_str("never"),
        }
    }
}

/// Whether to include the time zone annotation when rendering a zoned
/// date-time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTimeZone {
    /// Include the annotation.
    #[default]
    Auto,
    /// Never include the annotation.
    Never,
    /// Include the annotation with the critical flag.
    Critical,
}

impl FromStr for DisplayTimeZone {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "never" => Ok(Self::Never),
            "critical" => Ok(Self::Critical),
            _ => Err(TemporaError::range()
                .with_message("provided string was not a valid time zone display option")),
        }
    }
}

impl fmt::Display for DisplayTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Never => f.write_str("never"),
            Self::Critical => f.write_str("critical"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_ordering() {
        assert!(Unit::Year > Unit::Month);
        assert!(Unit::Day > Unit::Hour);
        assert!(Unit::Nanosecond < Unit::Microsecond);
        assert_eq!(Unit::Hour.larger(Unit::Minute).unwrap(), Unit::Hour);
        assert!(Unit::Auto.larger(Unit::Day).is_err());
    }

    #[test]
    fn increment_validation() {
        let thirty = RoundingIncrement::try_new(30).unwrap();
        assert!(thirty.validate(60, false).is_ok());
        // 45 does not divide 60 evenly.
        assert!(RoundingIncrement::try_new(45).unwrap().validate(60, false).is_err());
        // 60 is only valid when the dividend is inclusive.
        let sixty = RoundingIncrement::try_new(60).unwrap();
        assert!(sixty.validate(60, false).is_err());
        assert!(sixty.validate(60, true).is_ok());
    }

    #[test]
    fn since_negates_rounding_mode() {
        let settings = DifferenceSettings {
            rounding_mode: Some(RoundingMode::Ceil),
            ..Default::default()
        };
        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            DifferenceOperation::Since,
            UnitGroup::Time,
            Unit::Hour,
            Unit::Nanosecond,
        )
        .unwrap();
        assert_eq!(resolved.rounding_mode, RoundingMode::Floor);
    }

    #[test]
    fn to_string_precision_resolution() {
        let opts = ToStringRoundingOptions {
            precision: Precision::Digit(2),
            ..Default::default()
        };
        let resolved = opts.resolve().unwrap();
        assert_eq!(resolved.smallest_unit, Unit::Millisecond);
        assert_eq!(resolved.increment.get(), 10);

        assert!(ToStringRoundingOptions {
            precision: Precision::Digit(10),
            ..Default::default()
        }
        .resolve()
        .is_err());
    }
}
