//! The [`ZonedDateTime`] time-zone-aware type.

use alloc::string::String;
use core::num::NonZeroU128;

use crate::{
    calendar::{Calendar, MonthCode},
    duration::{
        DateDuration, Duration, NormalizedDurationRecord, NormalizedTimeDuration, RoundAnchor,
    },
    epoch_ns::EpochNanoseconds,
    instant::{round_epoch_ns, Instant},
    iso::{IsoDate, IsoDateTime},
    options::{
        ArithmeticOverflow, DifferenceOperation, DifferenceSettings, Disambiguation,
        DisplayCalendar, DisplayOffset, DisplayTimeZone, OffsetDisambiguation,
        ResolvedRoundingOptions, RoundingMode, RoundingOptions, ToStringRoundingOptions, Unit,
        UnitGroup,
    },
    parsers::{self, IsoStringBuilder, TimeZoneRecord, UtcOffsetRecordOrZ},
    plain_date::{PartialDate, PlainDate},
    plain_date_time::PlainDateTime,
    plain_time::{PartialTime, PlainTime},
    provider::TimeZoneProvider,
    rounding::IncrementRounder,
    timezone::{TimeZone, UtcOffset},
    Sign, TemporaError, TemporaResult, TemporaUnwrap,
};

const NS_PER_MINUTE: i128 = 60_000_000_000;

/// An exact time paired with a time zone and calendar, giving it a
/// civil reading.
///
/// Every civil observation goes through a [`TimeZoneProvider`]; the
/// exact time itself needs none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonedDateTime {
    epoch: EpochNanoseconds,
    timezone: TimeZone,
    calendar: Calendar,
}

impl ZonedDateTime {
    pub(crate) const fn new_unchecked(
        epoch: EpochNanoseconds,
        timezone: TimeZone,
        calendar: Calendar,
    ) -> Self {
        Self {
            epoch,
            timezone,
            calendar,
        }
    }

    /// Creates a zoned date-time from a nanosecond count since the
    /// Unix epoch.
    pub fn try_new(
        epoch_nanoseconds: i128,
        timezone: TimeZone,
        calendar: Calendar,
    ) -> TemporaResult<Self> {
        Ok(Self::new_unchecked(
            EpochNanoseconds::try_from(epoch_nanoseconds)?,
            timezone,
            calendar,
        ))
    }

    /// Places a civil date-time in a zone, resolving a gap or fold per
    /// the disambiguation behavior.
    pub fn from_plain_date_time(
        dt: &PlainDateTime,
        timezone: TimeZone,
        disambiguation: Disambiguation,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Self> {
        let epoch = timezone.get_epoch_nanoseconds_for(dt.iso(), disambiguation, provider)?;
        Ok(Self::new_unchecked(epoch, timezone, dt.calendar()))
    }

    /// Parses an interchange string carrying a time zone annotation.
    ///
    /// `offset_option` governs how a UTC offset in the string is
    /// reconciled against the zone; `disambiguation` applies when the
    /// offset does not decide the exact time.
    pub fn from_str_with_options(
        source: &str,
        disambiguation: Disambiguation,
        offset_option: OffsetDisambiguation,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Self> {
        let parsed = parsers::parse_zoned_date_time(source)?;
        let record = parsed.date.ok_or_else(|| {
            TemporaError::range().with_message("string does not contain a date")
        })?;
        let annotation = parsed.timezone.tempora_unwrap()?;
        let timezone = match annotation.tz {
            TimeZoneRecord::Named(name) => {
                TimeZone::try_from_identifier_str(&name)?.normalize(provider)?
            }
            TimeZoneRecord::Offset(offset) => {
                let minutes =
                    i16::from(offset.sign.as_sign_multiplier())
                        * (i16::from(offset.hour) * 60 + i16::from(offset.minute));
                TimeZone::UtcOffset(UtcOffset::from_minutes(minutes))
            }
        };
        let calendar = parsed
            .calendar
            .map(|id| Calendar::from_utf8(id.as_bytes()))
            .transpose()?
            .unwrap_or_default();

        let date = IsoDate::new_unchecked(record.year, record.month, record.day);
        let time = match parsed.time {
            Some(time) => PlainTime::from(time).iso(),
            // A date-only string reads as the start of that day.
            None => {
                let epoch = timezone.get_start_of_day(date, provider)?;
                return Ok(Self::new_unchecked(epoch, timezone, calendar));
            }
        };
        let iso = IsoDateTime::new(date, time)?;
        let civil_ns = iso.utc_epoch_nanoseconds();

        let epoch = match (parsed.offset, offset_option) {
            (Some(UtcOffsetRecordOrZ::Z), _) => EpochNanoseconds::try_from(civil_ns)?,
            (Some(UtcOffsetRecordOrZ::Offset(offset)), OffsetDisambiguation::Use) => {
                EpochNanoseconds::try_from(civil_ns - i128::from(offset.to_nanoseconds()))?
            }
            (Some(UtcOffsetRecordOrZ::Offset(offset)), OffsetDisambiguation::Prefer)
            | (Some(UtcOffsetRecordOrZ::Offset(offset)), OffsetDisambiguation::Reject) => {
                let offset_ns = i128::from(offset.to_nanoseconds());
                let candidates = timezone.get_possible_epoch_ns_for(iso, provider)?;
                let matched = candidates.as_slice().iter().copied().find(|candidate| {
                    let candidate_offset = civil_ns - candidate.as_i128();
                    if offset.has_seconds {
                        candidate_offset == offset_ns
                    } else {
                        // A minute-precision offset matches any
                        // sub-minute zone offset rounding to it.
                        round_offset_to_minutes(candidate_offset)
                            == Ok(offset_ns / NS_PER_MINUTE)
                    }
                });
                match matched {
                    Some(epoch) => epoch,
                    None if offset_option == OffsetDisambiguation::Reject => {
                        return Err(TemporaError::range().with_message(
                            "offset does not agree with the time zone at that time",
                        ));
                    }
                    None => timezone.disambiguate_possible_epoch_nanos(
                        candidates,
                        iso,
                        disambiguation,
                        provider,
                    )?,
                }
            }
            _ => timezone.get_epoch_nanoseconds_for(iso, disambiguation, provider)?,
        };
        Ok(Self::new_unchecked(epoch, timezone, calendar))
    }

    /// The nanosecond count since the Unix epoch.
    #[must_use]
    pub fn epoch_nanoseconds(&self) -> EpochNanoseconds {
        self.epoch
    }

    /// The millisecond count since the Unix epoch, truncated toward
    /// negative infinity.
    #[must_use]
    pub fn epoch_milliseconds(&self) -> i64 {
        self.epoch.as_i128().div_euclid(1_000_000) as i64
    }

    /// The time zone of this zoned date-time.
    pub fn timezone(&self) -> &TimeZone {
        &self.timezone
    }

    /// The calendar of this zoned date-time.
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    pub(crate) fn iso_datetime(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<IsoDateTime> {
        self.timezone.get_iso_datetime_for(self.epoch, provider)
    }

    /// The zone's offset from UTC at this exact time, in nanoseconds.
    pub fn offset_nanoseconds(&self, provider: &impl TimeZoneProvider) -> TemporaResult<i128> {
        self.timezone.get_offset_nanos_for(self.epoch.as_i128(), provider)
    }

    /// The zone's offset from UTC at this exact time, rendered as an
    /// offset string.
    pub fn offset(&self, provider: &impl TimeZoneProvider) -> TemporaResult<String> {
        let offset_ns = self.offset_nanoseconds(provider)?;
        let mut out = String::new();
        format_offset_ns(offset_ns, &mut out)
            .map_err(|_| TemporaError::assert())?;
        Ok(out)
    }

    // calendar-dependent getters

    /// The era, if the calendar has eras.
    pub fn era(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Option<tinystr::TinyAsciiStr<16>>> {
        self.calendar.era(self.iso_datetime(provider)?.date)
    }

    /// The year within the era, if the calendar has eras.
    pub fn era_year(&self, provider: &impl TimeZoneProvider) -> TemporaResult<Option<i32>> {
        self.calendar.era_year(self.iso_datetime(provider)?.date)
    }

    /// The calendar year.
    pub fn year(&self, provider: &impl TimeZoneProvider) -> TemporaResult<i32> {
        self.calendar.year(self.iso_datetime(provider)?.date)
    }

    /// The one-based ordinal month.
    pub fn month(&self, provider: &impl TimeZoneProvider) -> TemporaResult<u8> {
        self.calendar.month(self.iso_datetime(provider)?.date)
    }

    /// The month code.
    pub fn month_code(&self, provider: &impl TimeZoneProvider) -> TemporaResult<MonthCode> {
        self.calendar.month_code(self.iso_datetime(provider)?.date)
    }

    /// The day of the month.
    pub fn day(&self, provider: &impl TimeZoneProvider) -> TemporaResult<u8> {
        self.calendar.day(self.iso_datetime(provider)?.date)
    }

    /// The hour of the civil reading.
    pub fn hour(&self, provider: &impl TimeZoneProvider) -> TemporaResult<u8> {
        Ok(self.iso_datetime(provider)?.time.hour)
    }

    /// The minute of the civil reading.
    pub fn minute(&self, provider: &impl TimeZoneProvider) -> TemporaResult<u8> {
        Ok(self.iso_datetime(provider)?.time.minute)
    }

    /// The second of the civil reading.
    pub fn second(&self, provider: &impl TimeZoneProvider) -> TemporaResult<u8> {
        Ok(self.iso_datetime(provider)?.time.second)
    }

    /// The millisecond of the civil reading.
    pub fn millisecond(&self, provider: &impl TimeZoneProvider) -> TemporaResult<u16> {
        Ok(self.iso_datetime(provider)?.time.millisecond)
    }

    /// The microsecond of the civil reading.
    pub fn microsecond(&self, provider: &impl TimeZoneProvider) -> TemporaResult<u16> {
        Ok(self.iso_datetime(provider)?.time.microsecond)
    }

    /// The nanosecond of the civil reading.
    pub fn nanosecond(&self, provider: &impl TimeZoneProvider) -> TemporaResult<u16> {
        Ok(self.iso_datetime(provider)?.time.nanosecond)
    }

    /// The length of the civil day containing this exact time, in
    /// hours. A day crossing a transition is not 24 hours long.
    pub fn hours_in_day(&self, provider: &impl TimeZoneProvider) -> TemporaResult<f64> {
        let (start, end) = self.day_bounds(provider)?;
        Ok((end - start) as f64 / 3_600_000_000_000f64)
    }

    // mutations

    /// This exact time in another time zone.
    pub fn with_timezone(&self, timezone: TimeZone) -> Self {
        Self::new_unchecked(self.epoch, timezone, self.calendar)
    }

    /// This exact time in another calendar.
    pub fn with_calendar(&self, calendar: Calendar) -> Self {
        Self::new_unchecked(self.epoch, self.timezone.clone(), calendar)
    }

    /// The civil reading with the set fields of the partials replaced,
    /// re-resolved in the zone.
    pub fn with(
        &self,
        date: PartialDate,
        time: Option<PartialTime>,
        overflow: Option<ArithmeticOverflow>,
        disambiguation: Disambiguation,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Self> {
        let civil = self.to_plain_date_time(provider)?;
        let replaced = civil.with(date, time, overflow)?;
        Self::from_plain_date_time(&replaced, self.timezone.clone(), disambiguation, provider)
    }

    /// The same civil day with the clock replaced; absent means the
    /// start of the day.
    pub fn with_plain_time(
        &self,
        time: Option<PlainTime>,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Self> {
        let civil = self.iso_datetime(provider)?;
        let epoch = match time {
            Some(time) => self.timezone.get_epoch_nanoseconds_for(
                IsoDateTime::new(civil.date, time.iso())?,
                Disambiguation::Compatible,
                provider,
            )?,
            None => self.timezone.get_start_of_day(civil.date, provider)?,
        };
        Ok(Self::new_unchecked(
            epoch,
            self.timezone.clone(),
            self.calendar,
        ))
    }

    /// The exact time at which this civil day begins.
    pub fn start_of_day(&self, provider: &impl TimeZoneProvider) -> TemporaResult<Self> {
        let civil = self.iso_datetime(provider)?;
        let epoch = self.timezone.get_start_of_day(civil.date, provider)?;
        Ok(Self::new_unchecked(
            epoch,
            self.timezone.clone(),
            self.calendar,
        ))
    }

    // arithmetic

    /// Adds a duration. The calendar portion moves through civil time;
    /// the clock portion moves through exact time, so a day is as long
    /// as the zone says it is.
    pub fn add(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Self> {
        let epoch = self.add_record(
            duration.date(),
            duration.time().to_normalized()?,
            overflow.unwrap_or_default(),
            provider,
        )?;
        Ok(Self::new_unchecked(
            epoch,
            self.timezone.clone(),
            self.calendar,
        ))
    }

    /// Subtracts a duration; the negation of [`Self::add`].
    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<ArithmeticOverflow>,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Self> {
        self.add(&duration.negated(), overflow, provider)
    }

    pub(crate) fn add_normalized(
        &self,
        record: &NormalizedDurationRecord,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<EpochNanoseconds> {
        self.add_record(
            record.date(),
            record.normalized_time(),
            ArithmeticOverflow::Constrain,
            provider,
        )
    }

    fn add_record(
        &self,
        date: DateDuration,
        time: NormalizedTimeDuration,
        overflow: ArithmeticOverflow,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<EpochNanoseconds> {
        if date.sign() == Sign::Zero {
            return self.epoch.checked_add(time.0);
        }
        let civil = self.iso_datetime(provider)?;
        let added = self.calendar.date_add(civil.date, &date, overflow)?;
        let intermediate = self.timezone.get_epoch_nanoseconds_for(
            IsoDateTime::new(added, civil.time)?,
            Disambiguation::Compatible,
            provider,
        )?;
        intermediate.checked_add(time.0)
    }

    /// The duration from this zoned date-time to `other`.
    pub fn until(
        &self,
        other: &Self,
        settings: DifferenceSettings,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Duration> {
        self.diff(DifferenceOperation::Until, other, settings, provider)
    }

    /// The duration from `other` to this zoned date-time.
    pub fn since(
        &self,
        other: &Self,
        settings: DifferenceSettings,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Duration> {
        self.diff(DifferenceOperation::Since, other, settings, provider)
    }

    fn diff(
        &self,
        op: DifferenceOperation,
        other: &Self,
        settings: DifferenceSettings,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Duration> {
        if self.calendar != other.calendar {
            return Err(TemporaError::range()
                .with_message("zoned date-times can only be differenced within one calendar"));
        }
        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            op,
            UnitGroup::DateTime,
            Unit::Hour,
            Unit::Nanosecond,
        )?;
        let result = if resolved.largest_unit.is_time_unit() {
            // A pure clock difference needs no civil reading.
            let diff = other.epoch.as_i128() - self.epoch.as_i128();
            let rounded = if resolved.is_noop() {
                diff
            } else {
                let length = resolved.smallest_unit.as_nanoseconds().tempora_unwrap()?;
                let step = NonZeroU128::new(
                    u128::from(length) * u128::from(resolved.increment.get()),
                )
                .tempora_unwrap()?;
                IncrementRounder::from_signed_num(diff, step)?.round(resolved.rounding_mode)?
            };
            let record = NormalizedDurationRecord::new(
                DateDuration::default(),
                NormalizedTimeDuration::from_nanoseconds(rounded)?,
            )?;
            Duration::from_normalized(record, resolved.largest_unit)?
        } else {
            if self.timezone.identifier() != other.timezone.identifier() {
                return Err(TemporaError::range().with_message(
                    "a difference in day or calendar units requires matching time zones",
                ));
            }
            let record = self.diff_to_epoch_with_rounding(
                other.epoch.as_i128(),
                resolved,
                provider,
            )?;
            Duration::from_normalized(record, resolved.largest_unit)?
        };
        Ok(match op {
            DifferenceOperation::Until => result,
            DifferenceOperation::Since => result.negated(),
        })
    }

    /// The span from this exact time to `target_ns`, split into civil
    /// date units and a sub-day remainder, both read in this zone.
    pub(crate) fn diff_to_epoch(
        &self,
        target_ns: i128,
        largest_unit: Unit,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<NormalizedDurationRecord> {
        let this_ns = self.epoch.as_i128();
        if this_ns == target_ns {
            return NormalizedDurationRecord::new(
                DateDuration::default(),
                NormalizedTimeDuration::default(),
            );
        }
        let sign: i64 = if target_ns > this_ns { 1 } else { -1 };
        let civil_start = self.iso_datetime(provider)?;
        let civil_end = self
            .timezone
            .get_iso_datetime_for(EpochNanoseconds::try_from(target_ns)?, provider)?;

        let date_largest = if largest_unit < Unit::Day {
            Unit::Day
        } else {
            largest_unit
        };
        // Walk the end date toward the start until the remainder,
        // measured at the start's wall-clock time, agrees with the
        // overall sign. Transitions can require up to two steps.
        let max_corrections = if sign == 1 { 3 } else { 2 };
        for correction in 0..max_corrections {
            let end_days = civil_end.date.to_epoch_days() - sign * correction;
            let intermediate_date = IsoDate::from_epoch_days(end_days);
            let intermediate =
                IsoDateTime::new(intermediate_date, civil_start.time)?;
            let intermediate_ns = self
                .timezone
                .get_epoch_nanoseconds_for(intermediate, Disambiguation::Compatible, provider)?
                .as_i128();
            let remainder = target_ns - intermediate_ns;
            if remainder * i128::from(sign) >= 0 {
                let date = self.calendar.date_until(
                    civil_start.date,
                    intermediate_date,
                    date_largest,
                )?;
                return NormalizedDurationRecord::new(
                    date,
                    NormalizedTimeDuration::from_nanoseconds(remainder)?,
                );
            }
        }
        Err(TemporaError::assert())
    }

    pub(crate) fn diff_to_epoch_with_rounding(
        &self,
        target_ns: i128,
        options: ResolvedRoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<NormalizedDurationRecord> {
        let record = self.diff_to_epoch(target_ns, options.largest_unit, provider)?;
        if options.is_noop() {
            return Ok(record);
        }
        let civil = self.iso_datetime(provider)?;
        let anchor = RoundAnchor {
            date: civil.date,
            time: civil.time,
            calendar: self.calendar,
            timezone: Some((&self.timezone, provider)),
        };
        let (rounded, _) = record.round_relative(target_ns, &anchor, options)?;
        Ok(rounded)
    }

    /// Rounds the civil reading. Rounding to days snaps to the day's
    /// actual bounds in the zone.
    pub fn round(
        &self,
        options: RoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Self> {
        let resolved = ResolvedRoundingOptions::from_dt_options(options)?;
        if resolved.is_noop() {
            return Ok(self.clone());
        }
        let epoch = if resolved.smallest_unit == Unit::Day {
            let (start, end) = self.day_bounds(provider)?;
            let length = NonZeroU128::new((end - start) as u128).ok_or_else(|| {
                TemporaError::range().with_message("time zone reported an empty day")
            })?;
            let progress = self.epoch.as_i128() - start;
            let rounded =
                IncrementRounder::from_signed_num(progress, length)?
                    .round(resolved.rounding_mode)?;
            EpochNanoseconds::try_from(start + rounded)?
        } else {
            let civil = self.iso_datetime(provider)?;
            let (carry, time) = civil.time.round(resolved)?;
            let date = IsoDate::from_epoch_days(civil.date.to_epoch_days() + carry);
            self.timezone.get_epoch_nanoseconds_for(
                IsoDateTime::new(date, time)?,
                Disambiguation::Compatible,
                provider,
            )?
        };
        Ok(Self::new_unchecked(
            epoch,
            self.timezone.clone(),
            self.calendar,
        ))
    }

    fn day_bounds(&self, provider: &impl TimeZoneProvider) -> TemporaResult<(i128, i128)> {
        let civil = self.iso_datetime(provider)?;
        let start = self.timezone.get_start_of_day(civil.date, provider)?;
        let next = IsoDate::from_epoch_days(civil.date.to_epoch_days() + 1);
        let end = self.timezone.get_start_of_day(next, provider)?;
        Ok((start.as_i128(), end.as_i128()))
    }

    /// Orders two zoned date-times by exact time alone; the zone and
    /// calendar do not participate.
    pub fn compare_instant(&self, other: &Self) -> core::cmp::Ordering {
        self.epoch.cmp(&other.epoch)
    }

    // conversions

    /// The exact time, dropping zone and calendar.
    #[must_use]
    pub fn to_instant(&self) -> Instant {
        Instant::from(self.epoch)
    }

    /// The civil reading as a date-time.
    pub fn to_plain_date_time(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<PlainDateTime> {
        let civil = self.iso_datetime(provider)?;
        Ok(PlainDateTime::new_unchecked(civil, self.calendar))
    }

    /// The civil reading as a date.
    pub fn to_plain_date(&self, provider: &impl TimeZoneProvider) -> TemporaResult<PlainDate> {
        let civil = self.iso_datetime(provider)?;
        Ok(PlainDate::new_unchecked(civil.date, self.calendar))
    }

    /// The civil reading as a wall-clock time.
    pub fn to_plain_time(&self, provider: &impl TimeZoneProvider) -> TemporaResult<PlainTime> {
        let civil = self.iso_datetime(provider)?;
        Ok(PlainTime::new_unchecked(civil.time))
    }

    /// Renders the civil reading with its offset and annotations.
    pub fn to_ixdtf_string(
        &self,
        display_offset: DisplayOffset,
        display_timezone: DisplayTimeZone,
        display_calendar: DisplayCalendar,
        options: ToStringRoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<String> {
        let resolved = options.resolve()?;
        let length = resolved.smallest_unit.as_nanoseconds().tempora_unwrap()?;
        let step = NonZeroU128::new(u128::from(length) * u128::from(resolved.increment.get()))
            .tempora_unwrap()?;
        let epoch =
            EpochNanoseconds::try_from(round_epoch_ns(
                self.epoch.as_i128(),
                step,
                resolved.rounding_mode,
            ))?;
        let civil = self.timezone.get_iso_datetime_for(epoch, provider)?;
        let offset_ns = self.timezone.get_offset_nanos_for(epoch.as_i128(), provider)?;
        // Offsets display at minute precision.
        let minutes = round_offset_to_minutes(offset_ns)?;
        let sign = Sign::from_i128(minutes);
        let magnitude = minutes.unsigned_abs();
        let identifier = self.timezone.identifier();
        Ok(IsoStringBuilder::default()
            .with_date(civil.date)
            .with_time(civil.time, resolved.precision)
            .with_minute_offset(
                sign,
                (magnitude / 60) as u8,
                (magnitude % 60) as u8,
                display_offset,
            )
            .with_timezone(&identifier, display_timezone)
            .with_calendar(self.calendar.identifier(), display_calendar)
            .build())
    }

    /// Parses with the default behaviors: compatible disambiguation,
    /// rejecting an offset the zone cannot produce.
    pub fn from_str_with_provider(
        source: &str,
        provider: &impl TimeZoneProvider,
    ) -> TemporaResult<Self> {
        Self::from_str_with_options(
            source,
            Disambiguation::Compatible,
            OffsetDisambiguation::Reject,
            provider,
        )
    }
}

fn round_offset_to_minutes(offset_ns: i128) -> TemporaResult<i128> {
    let step = NonZeroU128::new(NS_PER_MINUTE as u128).tempora_unwrap()?;
    let rounded = IncrementRounder::from_signed_num(offset_ns, step)?
        .round(RoundingMode::HalfExpand)?;
    Ok(rounded / NS_PER_MINUTE)
}

fn format_offset_ns(offset_ns: i128, out: &mut String) -> core::fmt::Result {
    use core::fmt::Write;
    let sign = if offset_ns < 0 { '-' } else { '+' };
    let total_seconds = (offset_ns / 1_000_000_000).unsigned_abs();
    let (hour, minute, second) = (
        total_seconds / 3_600,
        total_seconds / 60 % 60,
        total_seconds % 60,
    );
    write!(out, "{sign}{hour:02}:{minute:02}")?;
    if second != 0 {
        write!(out, ":{second:02}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::test_support::FakeZoneProvider;
    use alloc::string::ToString;

    fn zdt(source: &str) -> ZonedDateTime {
        ZonedDateTime::from_str_with_provider(source, &FakeZoneProvider).unwrap()
    }

    #[test]
    fn civil_reading_follows_the_zone() {
        let winter = zdt("2000-01-15T12:00[Europe/Fake]");
        assert_eq!(winter.hour(&FakeZoneProvider).unwrap(), 12);
        assert_eq!(
            winter.offset_nanoseconds(&FakeZoneProvider).unwrap(),
            3_600_000_000_000
        );
        let summer = zdt("2000-07-01T12:00[Europe/Fake]");
        assert_eq!(
            summer.offset_nanoseconds(&FakeZoneProvider).unwrap(),
            7_200_000_000_000
        );
        assert_eq!(summer.offset(&FakeZoneProvider).unwrap(), "+02:00");
    }

    #[test]
    fn gap_resolves_per_disambiguation() {
        // 02:30 on 2000-03-26 is skipped in this zone.
        let compatible = ZonedDateTime::from_str_with_options(
            "2000-03-26T02:30[Europe/Fake]",
            Disambiguation::Compatible,
            OffsetDisambiguation::Reject,
            &FakeZoneProvider,
        )
        .unwrap();
        assert_eq!(compatible.hour(&FakeZoneProvider).unwrap(), 3);
        let earlier = ZonedDateTime::from_str_with_options(
            "2000-03-26T02:30[Europe/Fake]",
            Disambiguation::Earlier,
            OffsetDisambiguation::Reject,
            &FakeZoneProvider,
        )
        .unwrap();
        assert_eq!(earlier.hour(&FakeZoneProvider).unwrap(), 1);
        assert!(ZonedDateTime::from_str_with_options(
            "2000-03-26T02:30[Europe/Fake]",
            Disambiguation::Reject,
            OffsetDisambiguation::Reject,
            &FakeZoneProvider,
        )
        .is_err());
    }

    #[test]
    fn fold_honors_the_parsed_offset() {
        // 02:30 on 2000-10-29 occurs twice; the offset picks the side.
        let summer_side = zdt("2000-10-29T02:30+02:00[Europe/Fake]");
        let winter_side = zdt("2000-10-29T02:30+01:00[Europe/Fake]");
        assert_eq!(
            winter_side.epoch_nanoseconds().as_i128()
                - summer_side.epoch_nanoseconds().as_i128(),
            3_600_000_000_000
        );
        // A wrong offset is rejected, but Use takes it at face value.
        assert!(ZonedDateTime::from_str_with_options(
            "2000-10-29T02:30+05:00[Europe/Fake]",
            Disambiguation::Compatible,
            OffsetDisambiguation::Reject,
            &FakeZoneProvider,
        )
        .is_err());
        assert!(ZonedDateTime::from_str_with_options(
            "2000-10-29T02:30+05:00[Europe/Fake]",
            Disambiguation::Compatible,
            OffsetDisambiguation::Use,
            &FakeZoneProvider,
        )
        .is_ok());
    }

    #[test]
    fn add_days_follows_civil_time_across_a_gap() {
        let before = zdt("2000-03-25T12:00[Europe/Fake]");
        let after = before
            .add(
                &Duration::from_date_values(0, 0, 0, 1).unwrap(),
                None,
                &FakeZoneProvider,
            )
            .unwrap();
        // The civil clock is preserved even though the day is 23 hours.
        assert_eq!(after.hour(&FakeZoneProvider).unwrap(), 12);
        assert_eq!(
            after.epoch_nanoseconds().as_i128() - before.epoch_nanoseconds().as_i128(),
            23 * 3_600_000_000_000
        );
    }

    #[test]
    fn until_counts_zone_days() {
        let a = zdt("2000-03-25T12:00[Europe/Fake]");
        let b = zdt("2000-03-27T12:00[Europe/Fake]");
        let until = a
            .until(
                &b,
                DifferenceSettings {
                    largest_unit: Some(Unit::Day),
                    ..Default::default()
                },
                &FakeZoneProvider,
            )
            .unwrap();
        assert_eq!((until.days(), until.hours()), (2, 0));
        // In exact time those two civil days are 47 hours.
        let hours = a
            .until(&b, DifferenceSettings::default(), &FakeZoneProvider)
            .unwrap();
        assert_eq!(hours.hours(), 47);
    }

    #[test]
    fn round_to_day_uses_the_zone_day_length() {
        // The spring-forward day is 23 hours; 12:30 civil sits exactly
        // halfway through it.
        let half = zdt("2000-03-26T12:30[Europe/Fake]");
        let rounded = half.round(
            RoundingOptions {
                smallest_unit: Some(Unit::Day),
                ..Default::default()
            },
            &FakeZoneProvider,
        )
        .unwrap();
        assert_eq!(
            rounded.to_plain_date_time(&FakeZoneProvider).unwrap().to_string(),
            "2000-03-27T00:00:00"
        );
    }

    #[test]
    fn start_of_day_and_day_length() {
        // The gap on 2000-03-26 shortens the civil day to 23 hours;
        // midnight itself is untouched.
        let day = zdt("2000-03-26T12:00[Europe/Fake]");
        let start = day.start_of_day(&FakeZoneProvider).unwrap();
        assert_eq!(start.hour(&FakeZoneProvider).unwrap(), 0);
        assert_eq!(day.hours_in_day(&FakeZoneProvider).unwrap(), 23.0);
    }

    #[test]
    fn renders_with_offset_and_annotations() {
        let summer = zdt("2000-07-01T12:00[Europe/Fake]");
        let out = summer
            .to_ixdtf_string(
                DisplayOffset::Auto,
                DisplayTimeZone::Auto,
                DisplayCalendar::Auto,
                ToStringRoundingOptions::default(),
                &FakeZoneProvider,
            )
            .unwrap();
        assert_eq!(out, "2000-07-01T12:00:00+02:00[Europe/Fake]");
    }

    #[test]
    fn ordering_ignores_zone_and_calendar() {
        let named = zdt("2000-07-01T12:00[Europe/Fake]");
        let fixed = named
            .with_timezone(TimeZone::UtcOffset(UtcOffset::from_minutes(120)));
        assert_eq!(
            named.compare_instant(&fixed),
            core::cmp::Ordering::Equal
        );
        assert_ne!(named, fixed);
    }
}
