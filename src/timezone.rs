//! The [`TimeZone`] type and civil-to-exact time resolution.
//!
//! A time zone is either a fixed UTC offset at minute precision or a
//! named IANA zone whose rules live in a host-supplied
//! [`TimeZoneProvider`]. Mapping a civil reading to exact time can
//! yield zero candidates (a gap, when clocks spring forward) or two (a
//! fold, when they fall back); [`Disambiguation`] picks one.

use alloc::string::{String, ToString};
use core::str::FromStr;

use crate::{
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{Disambiguation, Precision},
    parsers::{self, FormattableOffset, FormattableTime},
    provider::TimeZoneProvider,
    EpochNanoseconds, Sign, TemporaError, TemporaResult, TemporaUnwrap, NS_PER_DAY,
};

/// A fixed offset from UTC at minute precision, east positive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcOffset(i16);

impl UtcOffset {
    /// Creates an offset from a count of minutes.
    #[must_use]
    pub fn from_minutes(minutes: i16) -> Self {
        Self(minutes)
    }

    /// Returns the offset as minutes.
    #[must_use]
    pub fn minutes(&self) -> i16 {
        self.0
    }

    pub(crate) fn to_nanoseconds(self) -> i128 {
        i128::from(self.0) * 60_000_000_000
    }
}

impl FromStr for UtcOffset {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parsers::parse_identifier(s)? {
            TimeZone::UtcOffset(offset) => Ok(offset),
            TimeZone::Named(_) => {
                Err(TemporaError::range().with_message("expected a UTC offset"))
            }
        }
    }
}

impl core::fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let minutes = self.0.unsigned_abs();
        let formattable = FormattableOffset {
            sign: if self.0 < 0 {
                Sign::Negative
            } else {
                Sign::Positive
            },
            time: FormattableTime {
                hour: (minutes / 60) as u8,
                minute: (minutes % 60) as u8,
                second: 0,
                nanosecond: 0,
                precision: Precision::Minute,
                include_sep: true,
            },
        };
        core::fmt::Display::fmt(&formattable, f)
    }
}

// Host-reported offsets must stay strictly within a day of UTC. A
// provider answer at or beyond this magnitude is a range error raised
// here, not passed through.
const MAX_OFFSET_SECONDS: i64 = 86_400;

fn provider_offset_nanos<P: TimeZoneProvider + ?Sized>(
    provider: &P,
    name: &str,
    epoch_ns: i128,
) -> TemporaResult<i128> {
    let offset = provider.offset_at(name, epoch_ns)?;
    if offset.0.abs() >= MAX_OFFSET_SECONDS {
        return Err(TemporaError::range()
            .with_message("time zone offset must be less than 24 hours from UTC"));
    }
    Ok(offset.to_nanoseconds())
}

/// The candidate exact times for one civil reading in a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CandidateEpochNanoseconds {
    /// The reading falls in a gap.
    Zero,
    /// The reading is unambiguous.
    One(EpochNanoseconds),
    /// The reading falls in a fold; candidates in ascending order.
    Two([EpochNanoseconds; 2]),
}

impl CandidateEpochNanoseconds {
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Self::Zero)
    }

    pub(crate) fn first(&self) -> Option<EpochNanoseconds> {
        match *self {
            Self::Zero => None,
            Self::One(ns) | Self::Two([ns, _]) => Some(ns),
        }
    }

    pub(crate) fn last(&self) -> Option<EpochNanoseconds> {
        match *self {
            Self::Zero => None,
            Self::One(ns) | Self::Two([_, ns]) => Some(ns),
        }
    }

    pub(crate) fn as_slice(&self) -> &[EpochNanoseconds] {
        match self {
            Self::Zero => &[],
            Self::One(ns) => core::slice::from_ref(ns),
            Self::Two(pair) => pair,
        }
    }
}

/// A time zone, either a fixed UTC offset or a named IANA zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimeZone {
    /// A fixed offset at minute precision.
    UtcOffset(UtcOffset),
    /// An IANA zone resolved through a [`TimeZoneProvider`].
    Named(String),
}

impl Default for TimeZone {
    fn default() -> Self {
        Self::UtcOffset(UtcOffset::default())
    }
}

impl TimeZone {
    /// Parses a standalone identifier: a minute-precision UTC offset
    /// or an IANA name.
    pub fn try_from_identifier_str(identifier: &str) -> TemporaResult<Self> {
        parsers::parse_identifier(identifier)
    }

    /// Parses an identifier, falling back to extracting the zone from
    /// any interchange string that carries one.
    pub fn try_from_str(source: &str) -> TemporaResult<Self> {
        if let Ok(zone) = parsers::parse_identifier(source) {
            return Ok(zone);
        }
        parsers::parse_allowed_timezone_formats(source)
            .ok_or_else(|| TemporaError::range().with_message("invalid time zone string"))
    }

    /// Returns the zone's identifier.
    #[must_use]
    pub fn identifier(&self) -> String {
        match self {
            Self::UtcOffset(offset) => offset.to_string(),
            Self::Named(name) => name.clone(),
        }
    }

    /// Validates a named zone against the provider, replacing the name
    /// with its normalized spelling.
    pub(crate) fn normalize<P: TimeZoneProvider + ?Sized>(
        self,
        provider: &P,
    ) -> TemporaResult<Self> {
        match self {
            Self::UtcOffset(_) => Ok(self),
            Self::Named(name) => {
                let normalized = provider.normalize_identifier(&name)?.into_owned();
                Ok(Self::Named(normalized))
            }
        }
    }

    /// The zone's offset from UTC at an exact time, in nanoseconds.
    pub(crate) fn get_offset_nanos_for<P: TimeZoneProvider + ?Sized>(
        &self,
        epoch_ns: i128,
        provider: &P,
    ) -> TemporaResult<i128> {
        match self {
            Self::UtcOffset(offset) => Ok(offset.to_nanoseconds()),
            Self::Named(name) => provider_offset_nanos(provider, name, epoch_ns),
        }
    }

    /// The candidate exact times for a civil reading in this zone.
    pub(crate) fn get_possible_epoch_ns_for<P: TimeZoneProvider + ?Sized>(
        &self,
        iso: IsoDateTime,
        provider: &P,
    ) -> TemporaResult<CandidateEpochNanoseconds> {
        let civil_ns = iso.utc_epoch_nanoseconds();
        let name = match self {
            Self::UtcOffset(offset) => {
                let epoch = EpochNanoseconds::try_from(civil_ns - offset.to_nanoseconds())?;
                return Ok(CandidateEpochNanoseconds::One(epoch));
            }
            Self::Named(name) => name,
        };

        // A transition near the reading shows up as differing offsets
        // two days either side. A candidate offset is real when the
        // zone reports that same offset at the exact time it implies.
        let window = 2 * i128::from(NS_PER_DAY);
        let before = provider_offset_nanos(provider, name, civil_ns - window)?;
        let after = provider_offset_nanos(provider, name, civil_ns + window)?;
        let offsets = [before, after];
        let distinct = if before == after { 1 } else { 2 };

        let mut candidates = CandidateEpochNanoseconds::Zero;
        for &offset in &offsets[..distinct] {
            let candidate = civil_ns - offset;
            if provider_offset_nanos(provider, name, candidate)? != offset {
                continue;
            }
            let epoch = EpochNanoseconds::try_from(candidate)?;
            candidates = match candidates {
                CandidateEpochNanoseconds::Zero => CandidateEpochNanoseconds::One(epoch),
                CandidateEpochNanoseconds::One(first) if first.0 <= epoch.0 => {
                    CandidateEpochNanoseconds::Two([first, epoch])
                }
                CandidateEpochNanoseconds::One(first) => {
                    CandidateEpochNanoseconds::Two([epoch, first])
                }
                full @ CandidateEpochNanoseconds::Two(_) => full,
            };
        }
        Ok(candidates)
    }

    /// Maps a civil reading to one exact time under the given
    /// disambiguation behavior.
    pub(crate) fn get_epoch_nanoseconds_for<P: TimeZoneProvider + ?Sized>(
        &self,
        iso: IsoDateTime,
        disambiguation: Disambiguation,
        provider: &P,
    ) -> TemporaResult<EpochNanoseconds> {
        let candidates = self.get_possible_epoch_ns_for(iso, provider)?;
        self.disambiguate_possible_epoch_nanos(candidates, iso, disambiguation, provider)
    }

    pub(crate) fn disambiguate_possible_epoch_nanos<P: TimeZoneProvider + ?Sized>(
        &self,
        candidates: CandidateEpochNanoseconds,
        iso: IsoDateTime,
        disambiguation: Disambiguation,
        provider: &P,
    ) -> TemporaResult<EpochNanoseconds> {
        match candidates {
            CandidateEpochNanoseconds::One(epoch) => Ok(epoch),
            CandidateEpochNanoseconds::Two([earlier, later]) => match disambiguation {
                Disambiguation::Compatible | Disambiguation::Earlier => Ok(earlier),
                Disambiguation::Later => Ok(later),
                Disambiguation::Reject => Err(TemporaError::range()
                    .with_message("civil time is repeated by a time zone transition")),
            },
            CandidateEpochNanoseconds::Zero => {
                if disambiguation == Disambiguation::Reject {
                    return Err(TemporaError::range()
                        .with_message("civil time is skipped by a time zone transition"));
                }
                // The reading sits inside a gap whose length is the
                // offset change across the transition. Shift the
                // reading out of the gap and resolve the shifted one.
                let civil_ns = iso.utc_epoch_nanoseconds();
                let day = i128::from(NS_PER_DAY);
                let before = self.get_offset_nanos_for(civil_ns - day, provider)?;
                let after = self.get_offset_nanos_for(civil_ns + day, provider)?;
                let shift = after - before;
                match disambiguation {
                    Disambiguation::Earlier => {
                        let shifted = IsoDateTime::from_epoch_nanoseconds(civil_ns - shift);
                        let possible = self.get_possible_epoch_ns_for(shifted, provider)?;
                        possible.first().tempora_unwrap()
                    }
                    _ => {
                        let shifted = IsoDateTime::from_epoch_nanoseconds(civil_ns + shift);
                        let possible = self.get_possible_epoch_ns_for(shifted, provider)?;
                        possible.last().tempora_unwrap()
                    }
                }
            }
        }
    }

    /// The civil reading of an exact time in this zone.
    pub(crate) fn get_iso_datetime_for<P: TimeZoneProvider + ?Sized>(
        &self,
        epoch: EpochNanoseconds,
        provider: &P,
    ) -> TemporaResult<IsoDateTime> {
        let offset = self.get_offset_nanos_for(epoch.0, provider)?;
        Ok(IsoDateTime::from_epoch_nanoseconds(epoch.0 + offset))
    }

    /// The exact time at which the given calendar day begins in this
    /// zone. Midnight can fall in a gap, in which case the day starts
    /// at the first representable time after it.
    pub(crate) fn get_start_of_day<P: TimeZoneProvider + ?Sized>(
        &self,
        date: IsoDate,
        provider: &P,
    ) -> TemporaResult<EpochNanoseconds> {
        let midnight = IsoDateTime::new_unchecked(date, IsoTime::default());
        let candidates = self.get_possible_epoch_ns_for(midnight, provider)?;
        if let Some(first) = candidates.first() {
            return Ok(first);
        }
        self.disambiguate_possible_epoch_nanos(
            candidates,
            midnight,
            Disambiguation::Compatible,
            provider,
        )
    }
}

impl FromStr for TimeZone {
    type Err = TemporaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_identifier_str(s)
    }
}

impl core::fmt::Display for TimeZone {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UtcOffset(offset) => offset.fmt(f),
            Self::Named(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::test_support::FakeZoneProvider;
    use alloc::string::ToString;

    const NS_PER_HOUR: i128 = 3_600_000_000_000;

    fn fake_zone() -> TimeZone {
        TimeZone::Named("Europe/Fake".to_string())
    }

    fn civil(year: i32, month: u8, day: u8, hour: u8, minute: u8) -> IsoDateTime {
        IsoDateTime::new_unchecked(
            IsoDate::new_unchecked(year, month, day),
            IsoTime::new_unchecked(hour, minute, 0, 0, 0, 0),
        )
    }

    #[test]
    fn offset_identifier_round_trip() {
        let offset = UtcOffset::from_str("+05:30").unwrap();
        assert_eq!(offset.minutes(), 330);
        assert_eq!(offset.to_string(), "+05:30");

        let offset = UtcOffset::from_str("-08").unwrap();
        assert_eq!(offset.minutes(), -480);
        assert_eq!(offset.to_string(), "-08:00");

        assert!(UtcOffset::from_str("Europe/Fake").is_err());
        assert!(UtcOffset::from_str("+05:30:01").is_err());
    }

    #[test]
    fn fixed_offset_resolution() {
        let zone = TimeZone::UtcOffset(UtcOffset::from_minutes(60));
        let iso = civil(2000, 1, 1, 12, 0);
        let epoch = zone
            .get_epoch_nanoseconds_for(iso, Disambiguation::Reject, &FakeZoneProvider)
            .unwrap();
        assert_eq!(epoch.as_i128(), iso.utc_epoch_nanoseconds() - NS_PER_HOUR);

        let back = zone.get_iso_datetime_for(epoch, &FakeZoneProvider).unwrap();
        assert_eq!(back, iso);
    }

    #[test]
    fn unambiguous_named_resolution() {
        let zone = fake_zone();
        let iso = civil(2000, 1, 15, 9, 0);
        let candidates = zone
            .get_possible_epoch_ns_for(iso, &FakeZoneProvider)
            .unwrap();
        assert_eq!(candidates.as_slice().len(), 1);
        let epoch = candidates.first().unwrap();
        assert_eq!(epoch.as_i128(), iso.utc_epoch_nanoseconds() - NS_PER_HOUR);
    }

    #[test]
    fn gap_resolution() {
        let zone = fake_zone();
        // 02:30 on the spring-forward day does not exist.
        let iso = civil(2000, 3, 26, 2, 30);
        let candidates = zone
            .get_possible_epoch_ns_for(iso, &FakeZoneProvider)
            .unwrap();
        assert!(candidates.is_empty());

        assert!(zone
            .get_epoch_nanoseconds_for(iso, Disambiguation::Reject, &FakeZoneProvider)
            .is_err());

        // Compatible moves forward: 02:30 becomes 03:30 at +02:00.
        let compatible = zone
            .get_epoch_nanoseconds_for(iso, Disambiguation::Compatible, &FakeZoneProvider)
            .unwrap();
        let expected = civil(2000, 3, 26, 3, 30).utc_epoch_nanoseconds() - 2 * NS_PER_HOUR;
        assert_eq!(compatible.as_i128(), expected);

        // Earlier moves back: 02:30 becomes 01:30 at +01:00.
        let earlier = zone
            .get_epoch_nanoseconds_for(iso, Disambiguation::Earlier, &FakeZoneProvider)
            .unwrap();
        let expected = civil(2000, 3, 26, 1, 30).utc_epoch_nanoseconds() - NS_PER_HOUR;
        assert_eq!(earlier.as_i128(), expected);
    }

    #[test]
    fn fold_resolution() {
        let zone = fake_zone();
        // 02:30 on the fall-back day happens twice.
        let iso = civil(2000, 10, 29, 2, 30);
        let candidates = zone
            .get_possible_epoch_ns_for(iso, &FakeZoneProvider)
            .unwrap();
        let slice = candidates.as_slice();
        assert_eq!(slice.len(), 2);
        let summer = iso.utc_epoch_nanoseconds() - 2 * NS_PER_HOUR;
        let winter = iso.utc_epoch_nanoseconds() - NS_PER_HOUR;
        assert_eq!(slice[0].as_i128(), summer);
        assert_eq!(slice[1].as_i128(), winter);

        let compatible = zone
            .get_epoch_nanoseconds_for(iso, Disambiguation::Compatible, &FakeZoneProvider)
            .unwrap();
        assert_eq!(compatible.as_i128(), summer);
        let later = zone
            .get_epoch_nanoseconds_for(iso, Disambiguation::Later, &FakeZoneProvider)
            .unwrap();
        assert_eq!(later.as_i128(), winter);
        assert!(zone
            .get_epoch_nanoseconds_for(iso, Disambiguation::Reject, &FakeZoneProvider)
            .is_err());
    }

    #[test]
    fn start_of_day_is_midnight_outside_transitions() {
        let zone = fake_zone();
        let date = IsoDate::new_unchecked(2000, 7, 1);
        let start = zone.get_start_of_day(date, &FakeZoneProvider).unwrap();
        let midnight = civil(2000, 7, 1, 0, 0).utc_epoch_nanoseconds();
        assert_eq!(start.as_i128(), midnight - 2 * NS_PER_HOUR);
    }

    #[test]
    fn out_of_range_provider_offset_is_rejected() {
        use crate::provider::UtcOffsetSeconds;
        use alloc::borrow::Cow;

        // A host answering +30:00 for every lookup. The resolver owns
        // the range check, so both lookup paths must error rather than
        // carry the offset into the arithmetic.
        struct WildOffsetProvider;

        impl TimeZoneProvider for WildOffsetProvider {
            fn normalize_identifier(&self, ident: &str) -> TemporaResult<Cow<'_, str>> {
                Ok(Cow::Owned(ident.to_string()))
            }

            fn offset_at(&self, _: &str, _: i128) -> TemporaResult<UtcOffsetSeconds> {
                Ok(UtcOffsetSeconds(30 * 3_600))
            }
        }

        let zone = fake_zone();
        let err = zone
            .get_offset_nanos_for(0, &WildOffsetProvider)
            .unwrap_err();
        assert!(err.to_string().contains("24 hours"));

        let iso = civil(2000, 1, 15, 9, 0);
        assert!(zone
            .get_possible_epoch_ns_for(iso, &WildOffsetProvider)
            .is_err());

        // Exactly one day out is equally invalid, in either direction.
        struct FullDayProvider;

        impl TimeZoneProvider for FullDayProvider {
            fn normalize_identifier(&self, ident: &str) -> TemporaResult<Cow<'_, str>> {
                Ok(Cow::Owned(ident.to_string()))
            }

            fn offset_at(&self, _: &str, _: i128) -> TemporaResult<UtcOffsetSeconds> {
                Ok(UtcOffsetSeconds(-86_400))
            }
        }

        assert!(zone.get_offset_nanos_for(0, &FullDayProvider).is_err());
    }

    #[test]
    fn zone_string_parsing() {
        assert_eq!(
            TimeZone::try_from_identifier_str("Europe/Fake").unwrap(),
            fake_zone()
        );
        assert!(TimeZone::try_from_identifier_str("1berlin").is_err());

        let from_string =
            TimeZone::try_from_str("2000-03-26T02:30:00+01:00[Europe/Fake]").unwrap();
        assert_eq!(from_string, fake_zone());
        let from_offset = TimeZone::try_from_str("2000-03-26T02:30:00+01:00").unwrap();
        assert_eq!(
            from_offset,
            TimeZone::UtcOffset(UtcOffset::from_minutes(60))
        );
    }
}
