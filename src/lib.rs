//! A calendar, time zone, and duration arithmetic engine with
//! nanosecond-resolution exact time.
//!
//! `tempora` separates *exact time* from *civil time*. Exact time is a
//! count of nanoseconds since the Unix epoch, represented by
//! [`Instant`]. Civil time is a calendar-relative wall reading,
//! represented by the `Plain*` family of immutable value types. The
//! [`ZonedDateTime`] type ties the two together through a time zone,
//! and [`Duration`] measures the difference between them in up to ten
//! units, from years down to nanoseconds.
//!
//! ## Example
//!
//! ```
//! use tempora::{Duration, PlainDate};
//!
//! let date = PlainDate::try_new_iso(2000, 5, 2).unwrap();
//! let later = date
//!     .add(&Duration::from_date_values(0, 1, 0, 0).unwrap(), None)
//!     .unwrap();
//! assert_eq!(later.to_string(), "2000-06-02");
//! ```
//!
//! Time zone rules are not bundled. Named time zones resolve through a
//! host-supplied [`provider::TimeZoneProvider`]; fixed-offset zones
//! work without one.

#![no_std]
#![warn(missing_docs)]
#![allow(
    // Every arithmetic path validates its range before casting.
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

extern crate alloc;
#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod error;
pub mod options;
pub mod parsers;
pub mod provider;

mod calendar;
mod duration;
mod epoch_ns;
mod instant;
mod iso;
mod month_day;
mod plain_date;
mod plain_date_time;
mod plain_time;
mod rounding;
mod timezone;
mod year_month;
mod zoned_date_time;

#[doc(inline)]
pub use calendar::{Calendar, MonthCode};
#[doc(inline)]
pub use duration::{DateDuration, Duration, PartialDuration, RelativeTo, TimeDuration};
#[doc(inline)]
pub use epoch_ns::EpochNanoseconds;
#[doc(inline)]
pub use error::TemporaError;
#[doc(inline)]
pub use instant::Instant;
#[doc(inline)]
pub use month_day::PlainMonthDay;
#[doc(inline)]
pub use plain_date::{PartialDate, PlainDate};
#[doc(inline)]
pub use plain_date_time::PlainDateTime;
#[doc(inline)]
pub use plain_time::{PartialTime, PlainTime};
#[doc(inline)]
pub use timezone::{TimeZone, UtcOffset};
#[doc(inline)]
pub use year_month::PlainYearMonth;
#[doc(inline)]
pub use zoned_date_time::ZonedDateTime;

/// The `Result` type returned by this crate's fallible operations.
pub type TemporaResult<T> = core::result::Result<T, TemporaError>;

/// Converts an `Option` into a `TemporaResult` carrying an assertion
/// error, for states that are unreachable when internal invariants
/// hold.
pub(crate) trait TemporaUnwrap {
    /// The value type produced on success.
    type Output;

    /// Unwraps the value or returns an assertion error.
    fn tempora_unwrap(self) -> TemporaResult<Self::Output>;
}

impl<T> TemporaUnwrap for Option<T> {
    type Output = T;

    #[inline]
    fn tempora_unwrap(self) -> TemporaResult<T> {
        self.ok_or(TemporaError::assert())
    }
}

/// Asserts an internal invariant, returning an assertion error instead
/// of panicking when it does not hold.
macro_rules! invariant {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            #[cfg(feature = "log")]
            log::error!($msg);
            return Err(crate::TemporaError::assert().with_message($msg));
        }
    };
}
pub(crate) use invariant;

// Exact time limits.
//
// The representable range of exact time is one hundred million days
// either side of the Unix epoch.
pub(crate) const MS_PER_DAY: u32 = 24 * 60 * 60 * 1000;
pub(crate) const NS_PER_DAY: u64 = (MS_PER_DAY as u64) * 1_000_000;
pub(crate) const NS_MAX_INSTANT: i128 = (NS_PER_DAY as i128) * 100_000_000;
pub(crate) const NS_MIN_INSTANT: i128 = -NS_MAX_INSTANT;

/// The sign of a value with a distinct zero state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i8)]
pub enum Sign {
    /// A positive value.
    Positive = 1,
    /// A zero value.
    #[default]
    Zero = 0,
    /// A negative value.
    Negative = -1,
}

impl Sign {
    pub(crate) fn from_i128(value: i128) -> Self {
        match value.cmp(&0) {
            core::cmp::Ordering::Greater => Self::Positive,
            core::cmp::Ordering::Equal => Self::Zero,
            core::cmp::Ordering::Less => Self::Negative,
        }
    }

    pub(crate) fn from_i64(value: i64) -> Self {
        Self::from_i128(value as i128)
    }

    /// Returns the inverted sign.
    #[inline]
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Zero => Self::Zero,
            Self::Negative => Self::Positive,
        }
    }

    /// Returns this sign as a signed multiplier.
    #[inline]
    #[must_use]
    pub fn as_sign_multiplier(self) -> i8 {
        self as i8
    }
}
