use super::*;
use crate::{
    options::{RoundingMode, RoundingOptions, Unit},
    plain_date::PlainDate,
    provider::NeverProvider,
    Sign,
};
use alloc::string::ToString;
use core::str::FromStr;

fn relative_date(year: i32, month: u8, day: u8) -> RelativeTo {
    RelativeTo::PlainDate(PlainDate::try_new_iso(year, month, day).unwrap())
}

#[test]
fn field_signs_must_agree() {
    assert!(Duration::new(1, 0, 0, -1, 0, 0, 0, 0, 0, 0).is_err());
    assert!(Duration::new(0, 0, 0, 0, -1, 30, 0, 0, 0, 0).is_err());
    let negative = Duration::new(0, 0, 0, -1, -2, 0, 0, 0, 0, 0).unwrap();
    assert_eq!(negative.sign(), Sign::Negative);
    assert_eq!(negative.abs().sign(), Sign::Positive);
    assert!(Duration::default().is_zero());
}

#[test]
fn partial_requires_a_field() {
    assert!(Duration::from_partial_duration(PartialDuration::default()).is_err());
    let duration = Duration::from_partial_duration(PartialDuration {
        hours: Some(2),
        minutes: Some(30),
        ..Default::default()
    })
    .unwrap();
    assert_eq!((duration.hours(), duration.minutes()), (2, 30));
}

#[test]
fn parse_canonical_forms() {
    let duration = Duration::from_str("P1Y2M3W4DT5H6M7.5S").unwrap();
    assert_eq!(duration.years(), 1);
    assert_eq!(duration.weeks(), 3);
    assert_eq!(duration.seconds(), 7);
    assert_eq!(duration.milliseconds(), 500);

    // A fractional component cascades into the smaller fields.
    let fractional = Duration::from_str("PT1.5H").unwrap();
    assert_eq!((fractional.hours(), fractional.minutes()), (1, 30));

    let negative = Duration::from_str("-PT1H").unwrap();
    assert_eq!(negative.hours(), -1);

    // Only the last present component may carry a fraction.
    assert!(Duration::from_str("PT1.5H30M").is_err());
    assert!(Duration::from_str("P").is_err());
}

#[test]
fn display_canonical_forms() {
    assert_eq!(Duration::default().to_string(), "PT0S");
    assert_eq!(
        Duration::new(1, 0, 0, 2, 0, 0, 3, 0, 0, 0)
            .unwrap()
            .to_string(),
        "P1Y2DT3S"
    );
    assert_eq!(
        Duration::new(0, 0, 0, 0, 0, 0, -1, -500, 0, 0)
            .unwrap()
            .to_string(),
        "-PT1.5S"
    );
    // Sub-second fields merge into the seconds figure.
    assert_eq!(
        Duration::new(0, 0, 0, 0, 0, 0, 0, 0, 0, 1)
            .unwrap()
            .to_string(),
        "PT0.000000001S"
    );
}

#[test]
fn add_is_exact_time_only() {
    let a = Duration::from_str("PT23H").unwrap();
    let b = Duration::from_str("PT2H30M").unwrap();
    let sum = a.add(&b).unwrap();
    assert_eq!((sum.hours(), sum.minutes()), (25, 30));
    let diff = sum.subtract(&b).unwrap();
    assert_eq!(diff.hours(), 23);

    let month = Duration::from_date_values(0, 1, 0, 0).unwrap();
    assert!(a.add(&month).is_err());
}

#[test]
fn round_without_a_reference_point() {
    let duration = Duration::from_str("PT90M").unwrap();
    let rounded = duration
        .round(
            RoundingOptions {
                largest_unit: Some(Unit::Hour),
                ..Default::default()
            },
            None,
            &NeverProvider,
        )
        .unwrap();
    assert_eq!((rounded.hours(), rounded.minutes()), (1, 30));

    // Calendar units have no fixed length on their own.
    assert!(duration
        .round(
            RoundingOptions {
                smallest_unit: Some(Unit::Year),
                ..Default::default()
            },
            None,
            &NeverProvider,
        )
        .is_err());
    assert!(Duration::from_date_values(0, 1, 0, 0)
        .unwrap()
        .round(
            RoundingOptions {
                smallest_unit: Some(Unit::Day),
                ..Default::default()
            },
            None,
            &NeverProvider,
        )
        .is_err());
}

#[test]
fn round_against_a_date() {
    // February 2000 has 29 days; 20 days is past the midpoint.
    let duration = Duration::from_str("P1M20D").unwrap();
    let rounded = duration
        .round(
            RoundingOptions {
                smallest_unit: Some(Unit::Month),
                ..Default::default()
            },
            Some(&relative_date(2000, 1, 1)),
            &NeverProvider,
        )
        .unwrap();
    assert_eq!(rounded.to_string(), "P2M");

    let truncated = duration
        .round(
            RoundingOptions {
                smallest_unit: Some(Unit::Month),
                rounding_mode: Some(RoundingMode::Trunc),
                ..Default::default()
            },
            Some(&relative_date(2000, 1, 1)),
            &NeverProvider,
        )
        .unwrap();
    assert_eq!(truncated.to_string(), "P1M");
}

#[test]
fn round_balances_up_to_the_largest_unit() {
    let duration = Duration::from_str("P23D").unwrap();
    let rounded = duration
        .round(
            RoundingOptions {
                largest_unit: Some(Unit::Week),
                ..Default::default()
            },
            Some(&relative_date(2000, 1, 1)),
            &NeverProvider,
        )
        .unwrap();
    assert_eq!((rounded.weeks(), rounded.days()), (3, 2));
}

#[test]
fn totals() {
    let duration = Duration::from_str("PT90M").unwrap();
    let hours = duration.total(Unit::Hour, None, &NeverProvider).unwrap();
    assert!((hours - 1.5).abs() < f64::EPSILON);

    // Days without calendar fields need no reference point.
    let day = Duration::from_date_values(0, 0, 0, 1).unwrap();
    let minutes = day.total(Unit::Minute, None, &NeverProvider).unwrap();
    assert!((minutes - 1440.0).abs() < f64::EPSILON);

    let month = Duration::from_date_values(0, 1, 0, 0).unwrap();
    assert!(month.total(Unit::Day, None, &NeverProvider).is_err());
    let days = month
        .total(Unit::Day, Some(&relative_date(2000, 1, 1)), &NeverProvider)
        .unwrap();
    assert!((days - 31.0).abs() < f64::EPSILON);
}

#[test]
fn compare_with_and_without_a_reference_point() {
    let day = Duration::from_str("P1D").unwrap();
    let hours = Duration::from_str("PT25H").unwrap();
    assert_eq!(
        day.compare(&hours, None, &NeverProvider).unwrap(),
        core::cmp::Ordering::Less
    );

    let month = Duration::from_date_values(0, 1, 0, 0).unwrap();
    let thirty = Duration::from_date_values(0, 0, 0, 30).unwrap();
    assert!(month.compare(&thirty, None, &NeverProvider).is_err());
    assert_eq!(
        month
            .compare(&thirty, Some(&relative_date(2000, 1, 1)), &NeverProvider)
            .unwrap(),
        core::cmp::Ordering::Greater
    );
}

#[test]
fn string_precision_control() {
    let duration = Duration::new(0, 0, 0, 0, 0, 0, 1, 234, 560, 0).unwrap();
    let out = duration
        .as_temporal_string(ToStringRoundingOptions {
            precision: Precision::Digit(2),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(out, "PT1.23S");
    let auto = duration
        .as_temporal_string(ToStringRoundingOptions::default())
        .unwrap();
    assert_eq!(auto, "PT1.23456S");
}
