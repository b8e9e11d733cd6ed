//! The [`TimeZoneProvider`] trait.
//!
//! Time zone rules are not bundled with this crate. Operations on
//! named zones take a provider supplied by the host, which answers
//! the one question the arithmetic needs: what is the zone's UTC
//! offset at a given exact time?

use crate::{TemporaError, TemporaResult};
use alloc::borrow::Cow;

/// An offset from UTC in whole seconds, east positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UtcOffsetSeconds(pub i64);

impl UtcOffsetSeconds {
    pub(crate) fn to_nanoseconds(self) -> i128 {
        i128::from(self.0) * 1_000_000_000
    }
}

/// A source of time zone rules.
pub trait TimeZoneProvider {
    /// Validates a named identifier, returning its normalized
    /// spelling.
    fn normalize_identifier(&self, ident: &str) -> TemporaResult<Cow<'_, str>>;

    /// The offset of the named zone at an exact time.
    fn offset_at(
        &self,
        identifier: &str,
        epoch_nanoseconds: i128,
    ) -> TemporaResult<UtcOffsetSeconds>;
}

/// A provider that rejects every named zone, for contexts where only
/// fixed-offset zones are expected.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverProvider;

impl TimeZoneProvider for NeverProvider {
    fn normalize_identifier(&self, _ident: &str) -> TemporaResult<Cow<'_, str>> {
        Err(TemporaError::range().with_message("named time zones are not supported here"))
    }

    fn offset_at(&self, _: &str, _: i128) -> TemporaResult<UtcOffsetSeconds> {
        Err(TemporaError::range().with_message("named time zones are not supported here"))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{TimeZoneProvider, UtcOffsetSeconds};
    use crate::{TemporaError, TemporaResult};
    use alloc::borrow::Cow;

    const NS_PER_DAY: i128 = 86_400_000_000_000;
    const NS_PER_HOUR: i128 = 3_600_000_000_000;

    // 2000-03-26 and 2000-10-29 as days since the epoch.
    const SPRING_FORWARD: i128 = 11_042 * NS_PER_DAY + NS_PER_HOUR;
    const FALL_BACK: i128 = 11_259 * NS_PER_DAY + NS_PER_HOUR;

    /// A single made-up zone at +01:00 with a +02:00 summer stretch in
    /// the year 2000, enough to exercise gaps and folds.
    pub(crate) struct FakeZoneProvider;

    impl TimeZoneProvider for FakeZoneProvider {
        fn normalize_identifier(&self, ident: &str) -> TemporaResult<Cow<'_, str>> {
            if ident.eq_ignore_ascii_case("Europe/Fake") {
                return Ok(Cow::Borrowed("Europe/Fake"));
            }
            Err(TemporaError::range().with_message("unknown time zone"))
        }

        fn offset_at(
            &self,
            identifier: &str,
            epoch_nanoseconds: i128,
        ) -> TemporaResult<UtcOffsetSeconds> {
            if !identifier.eq_ignore_ascii_case("Europe/Fake") {
                return Err(TemporaError::range().with_message("unknown time zone"));
            }
            if (SPRING_FORWARD..FALL_BACK).contains(&epoch_nanoseconds) {
                Ok(UtcOffsetSeconds(7_200))
            } else {
                Ok(UtcOffsetSeconds(3_600))
            }
        }
    }
}
