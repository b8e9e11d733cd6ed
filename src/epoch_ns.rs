//! A range-checked count of nanoseconds since the Unix epoch.

use crate::{TemporaError, TemporaResult, NS_MAX_INSTANT, NS_MIN_INSTANT};

/// A nanosecond count since the Unix epoch, restricted to the
/// representable range of exact time (one hundred million days either
/// side of the epoch).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpochNanoseconds(pub(crate) i128);

impl EpochNanoseconds {
    /// Returns the underlying nanosecond count.
    #[inline]
    #[must_use]
    pub fn as_i128(self) -> i128 {
        self.0
    }

    /// Validates that the count is within the representable range.
    pub(crate) fn check_validity(self) -> TemporaResult<()> {
        if !is_valid_epoch_nanos(self.0) {
            return Err(TemporaError::range()
                .with_message("instant is outside the representable range of exact time"));
        }
        Ok(())
    }

    pub(crate) fn checked_add(self, nanoseconds: i128) -> TemporaResult<Self> {
        let sum = self.0.checked_add(nanoseconds).ok_or_else(|| {
            TemporaError::range()
                .with_message("instant is outside the representable range of exact time")
        })?;
        Self::try_from(sum)
    }
}

impl TryFrom<i128> for EpochNanoseconds {
    type Error = TemporaError;

    fn try_from(value: i128) -> Result<Self, Self::Error> {
        let candidate = Self(value);
        candidate.check_validity()?;
        Ok(candidate)
    }
}

/// Checks whether a nanosecond count is within the representable range.
#[inline]
pub(crate) fn is_valid_epoch_nanos(nanos: i128) -> bool {
    (NS_MIN_INSTANT..=NS_MAX_INSTANT).contains(&nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_limits() {
        assert!(EpochNanoseconds::try_from(NS_MAX_INSTANT).is_ok());
        assert!(EpochNanoseconds::try_from(NS_MIN_INSTANT).is_ok());
        assert!(EpochNanoseconds::try_from(NS_MAX_INSTANT + 1).is_err());
        assert!(EpochNanoseconds::try_from(NS_MIN_INSTANT - 1).is_err());
    }
}
