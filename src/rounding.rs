//! Increment rounding over signed integer quantities.
//!
//! Rounding reduces a signed rounding mode over the sign of the value
//! to one of five unsigned modes, then chooses between the two
//! surrounding multiples of the increment with exact integer
//! comparisons. No floating point is involved.

use crate::{
    options::{RoundingMode, UnsignedRoundingMode},
    TemporaResult, TemporaUnwrap,
};
use core::{cmp::Ordering, num::NonZeroU128, ops::Neg};
use num_traits::{ConstZero, Euclid, NumCast, Signed};

pub(crate) trait Roundable:
    Signed + Euclid + PartialOrd + NumCast + ConstZero + Copy
{
    /// Whether the dividend is an exact multiple of the divisor.
    fn is_exact(dividend: Self, divisor: Self) -> bool;
    /// Compares the distance below the value against the distance
    /// above it: `Less` means the floor multiple is closer.
    fn compare_remainder(dividend: Self, divisor: Self) -> Option<Ordering>;
    /// Whether the floor multiple is even.
    fn is_even_cardinal(dividend: Self, divisor: Self) -> bool;
    fn result_floor(dividend: Self, divisor: Self) -> u128;
    fn result_ceil(dividend: Self, divisor: Self) -> u128;
    fn quotient_abs(dividend: Self, divisor: Self) -> Self {
        (dividend / divisor).abs()
    }
}

/// A quantity paired with the increment it will be rounded to a
/// multiple of.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub(crate) struct IncrementRounder<T: Roundable> {
    sign: bool,
    dividend: T,
    divisor: T,
}

impl<T: Roundable> IncrementRounder<T> {
    #[inline]
    pub(crate) fn from_signed_num(number: T, increment: NonZeroU128) -> TemporaResult<Self> {
        let divisor = <T as NumCast>::from(increment.get()).tempora_unwrap()?;
        Ok(Self {
            sign: number >= T::ZERO,
            dividend: number,
            divisor,
        })
    }

    /// Rounds to a multiple of the increment under the provided mode.
    #[inline]
    pub(crate) fn round(&self, mode: RoundingMode) -> TemporaResult<i128> {
        let unsigned_mode = mode.get_unsigned_round_mode(self.sign);
        let mut rounded =
            apply_unsigned_rounding_mode(self.dividend, self.divisor, unsigned_mode) as i128;
        if !self.sign {
            rounded = rounded.neg();
        }
        let divisor = <i128 as NumCast>::from(self.divisor).tempora_unwrap()?;
        Ok(rounded * divisor)
    }
}

macro_rules! impl_roundable_integer {
    ($($t:ty),*) => {
        $(
            impl Roundable for $t {
                fn is_exact(dividend: Self, divisor: Self) -> bool {
                    dividend.rem_euclid(divisor) == 0
                }

                fn compare_remainder(dividend: Self, divisor: Self) -> Option<Ordering> {
                    // 2r vs d avoids the truncation of d / 2 for odd
                    // divisors; widen so the doubling cannot overflow.
                    let remainder = <i128 as From<Self>>::from(dividend.abs() % divisor);
                    Some((remainder * 2).cmp(&<i128 as From<Self>>::from(divisor)))
                }

                fn is_even_cardinal(dividend: Self, divisor: Self) -> bool {
                    Roundable::result_floor(dividend, divisor) % 2 == 0
                }

                fn result_floor(dividend: Self, divisor: Self) -> u128 {
                    Roundable::quotient_abs(dividend, divisor) as u128
                }

                fn result_ceil(dividend: Self, divisor: Self) -> u128 {
                    Roundable::quotient_abs(dividend, divisor) as u128 + 1
                }
            }
        )*
    };
}
impl_roundable_integer!(i64, i128);

/// Applies the unsigned rounding mode, returning the chosen multiple
/// of the divisor as an unsigned cardinal.
fn apply_unsigned_rounding_mode<T: Roundable>(
    dividend: T,
    divisor: T,
    mode: UnsignedRoundingMode,
) -> u128 {
    if Roundable::is_exact(dividend, divisor) {
        return Roundable::result_floor(dividend, divisor);
    }
    match mode {
        UnsignedRoundingMode::Zero => Roundable::result_floor(dividend, divisor),
        UnsignedRoundingMode::Infinity => Roundable::result_ceil(dividend, divisor),
        half => match Roundable::compare_remainder(dividend, divisor) {
            Some(Ordering::Less) => Roundable::result_floor(dividend, divisor),
            Some(Ordering::Greater) => Roundable::result_ceil(dividend, divisor),
            Some(Ordering::Equal) => match half {
                UnsignedRoundingMode::HalfZero => Roundable::result_floor(dividend, divisor),
                UnsignedRoundingMode::HalfInfinity => Roundable::result_ceil(dividend, divisor),
                // half-even
                _ if Roundable::is_even_cardinal(dividend, divisor) => {
                    Roundable::result_floor(dividend, divisor)
                }
                _ => Roundable::result_ceil(dividend, divisor),
            },
            None => Roundable::result_floor(dividend, divisor),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{IncrementRounder, Roundable, RoundingMode};
    use core::fmt::Debug;
    use core::num::NonZeroU128;

    #[derive(Debug)]
    struct TestCase<T> {
        x: T,
        increment: u128,
        ceil: i128,
        floor: i128,
        expand: i128,
        trunc: i128,
        half_ceil: i128,
        half_floor: i128,
        half_expand: i128,
        half_trunc: i128,
        half_even: i128,
    }

    impl<T: Roundable + Debug> TestCase<T> {
        fn run(&self) {
            let rounder = IncrementRounder::from_signed_num(
                self.x,
                NonZeroU128::new(self.increment).unwrap(),
            )
            .unwrap();
            let modes = [
                (RoundingMode::Ceil, self.ceil),
                (RoundingMode::Floor, self.floor),
                (RoundingMode::Expand, self.expand),
                (RoundingMode::Trunc, self.trunc),
                (RoundingMode::HalfCeil, self.half_ceil),
                (RoundingMode::HalfFloor, self.half_floor),
                (RoundingMode::HalfExpand, self.half_expand),
                (RoundingMode::HalfTrunc, self.half_trunc),
                (RoundingMode::HalfEven, self.half_even),
            ];
            for (mode, expected) in modes {
                assert_eq!(
                    expected,
                    rounder.round(mode).unwrap(),
                    "rounding {:?} by {:?} with mode {mode}",
                    self.x,
                    self.increment
                );
            }
        }
    }

    #[test]
    fn positive_rounding() {
        let cases: &[TestCase<i128>] = &[
            TestCase {
                x: 100,
                increment: 10,
                ceil: 100,
                floor: 100,
                expand: 100,
                trunc: 100,
                half_ceil: 100,
                half_floor: 100,
                half_expand: 100,
                half_trunc: 100,
                half_even: 100,
            },
            TestCase {
                x: 101,
                increment: 10,
                ceil: 110,
                floor: 100,
                expand: 110,
                trunc: 100,
                half_ceil: 100,
                half_floor: 100,
                half_expand: 100,
                half_trunc: 100,
                half_even: 100,
            },
            TestCase {
                x: 105,
                increment: 10,
                ceil: 110,
                floor: 100,
                expand: 110,
                trunc: 100,
                half_ceil: 110,
                half_floor: 100,
                half_expand: 110,
                half_trunc: 100,
                half_even: 100,
            },
            TestCase {
                x: 107,
                increment: 10,
                ceil: 110,
                floor: 100,
                expand: 110,
                trunc: 100,
                half_ceil: 110,
                half_floor: 110,
                half_expand: 110,
                half_trunc: 110,
                half_even: 110,
            },
        ];
        for case in cases {
            case.run();
        }
    }

    #[test]
    fn negative_rounding() {
        let cases: &[TestCase<i128>] = &[
            TestCase {
                x: -101,
                increment: 10,
                ceil: -100,
                floor: -110,
                expand: -110,
                trunc: -100,
                half_ceil: -100,
                half_floor: -100,
                half_expand: -100,
                half_trunc: -100,
                half_even: -100,
            },
            TestCase {
                x: -105,
                increment: 10,
                ceil: -100,
                floor: -110,
                expand: -110,
                trunc: -100,
                half_ceil: -100,
                half_floor: -110,
                half_expand: -110,
                half_trunc: -100,
                half_even: -100,
            },
            TestCase {
                x: -9i128,
                increment: 2,
                ceil: -8,
                floor: -10,
                expand: -10,
                trunc: -8,
                half_ceil: -8,
                half_floor: -10,
                half_expand: -10,
                half_trunc: -8,
                half_even: -8,
            },
            TestCase {
                x: -14i128,
                increment: 3,
                ceil: -12,
                floor: -15,
                expand: -15,
                trunc: -12,
                half_ceil: -15,
                half_floor: -15,
                half_expand: -15,
                half_trunc: -15,
                half_even: -15,
            },
        ];
        for case in cases {
            case.run();
        }
    }

    #[test]
    fn odd_divisor_is_not_a_tie() {
        // 13 / 3 is a third past the floor multiple, not a tie.
        TestCase {
            x: 13i64,
            increment: 3,
            ceil: 15,
            floor: 12,
            expand: 15,
            trunc: 12,
            half_ceil: 12,
            half_floor: 12,
            half_expand: 12,
            half_trunc: 12,
            half_even: 12,
        }
        .run();
    }

    #[test]
    fn half_minute_rounding() {
        let result = IncrementRounder::<i128>::from_signed_num(
            -84_082_624_864_197_532,
            NonZeroU128::new(1_800_000_000_000).unwrap(),
        )
        .unwrap()
        .round(RoundingMode::HalfExpand)
        .unwrap();
        assert_eq!(result, -84_083_400_000_000_000);
    }
}
