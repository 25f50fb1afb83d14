//! Input validation tests
//!
//! Range and format checks applied at the API boundary before any record is
//! stored: plant counts, lot numbers, dates, scores and comparison windows.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    is_valid_health_score, validate_comparison_window, validate_confidence, validate_email,
    validate_harvest_dates, validate_health_score, validate_lot_number, validate_password,
    validate_percentage, validate_plant_count, validate_yield,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_plant_count_must_be_positive() {
    assert!(validate_plant_count(1).is_ok());
    assert!(validate_plant_count(0).is_err());
    assert_eq!(validate_plant_count(-3).unwrap_err().field, "plant_count");
}

#[test]
fn test_lot_number_format() {
    assert!(validate_lot_number("LOT-2024-001").is_ok());
    assert!(validate_lot_number("zone_a_12").is_ok());
    assert!(validate_lot_number("").is_err());
    assert!(validate_lot_number("LOT 1").is_err());
    assert!(validate_lot_number("LOT/1").is_err());
    assert!(validate_lot_number(&"A".repeat(51)).is_err());
}

#[test]
fn test_harvest_dates_not_before_planting() {
    let planted = date(2024, 1, 10);
    assert!(validate_harvest_dates(planted, Some(date(2024, 5, 1)), None).is_ok());
    assert!(validate_harvest_dates(planted, Some(planted), Some(planted)).is_ok());

    let err = validate_harvest_dates(planted, Some(date(2023, 12, 31)), None).unwrap_err();
    assert_eq!(err.field, "expected_harvest_date");

    let err = validate_harvest_dates(planted, None, Some(date(2024, 1, 9))).unwrap_err();
    assert_eq!(err.field, "actual_harvest_date");
}

#[test]
fn test_yield_cannot_be_negative() {
    assert!(validate_yield("current_yield", Decimal::ZERO).is_ok());
    let err = validate_yield("current_yield", Decimal::new(-1, 1)).unwrap_err();
    assert_eq!(err.field, "current_yield");
}

#[test]
fn test_health_score_bounds() {
    assert!(validate_health_score(Decimal::ZERO).is_ok());
    assert!(validate_health_score(Decimal::ONE_HUNDRED).is_ok());
    assert!(validate_health_score(Decimal::new(1001, 1)).is_err());
    assert!(validate_health_score(Decimal::new(-1, 2)).is_err());
}

#[test]
fn test_confidence_bounds() {
    assert!(validate_confidence(Decimal::new(85, 2)).is_ok());
    assert!(validate_confidence(Decimal::ONE).is_ok());
    assert!(validate_confidence(Decimal::new(101, 2)).is_err());
}

#[test]
fn test_percentage_reports_field() {
    let err = validate_percentage("humidity_percent", Decimal::from(120)).unwrap_err();
    assert_eq!(err.field, "humidity_percent");
}

#[test]
fn test_comparison_window() {
    assert!(validate_comparison_window(0).is_err());
    assert!(validate_comparison_window(1).is_ok());
    assert!(validate_comparison_window(365).is_ok());
    assert!(validate_comparison_window(366).is_err());
}

#[test]
fn test_credentials() {
    assert!(validate_email("grower@farm.example").is_ok());
    assert!(validate_email("grower").is_err());
    assert!(validate_password("longenough").is_ok());
    assert!(validate_password("short").is_err());
}

proptest! {
    #[test]
    fn prop_health_score_validity_matches_range(hundredths in -20_000i64..20_000) {
        let score = Decimal::new(hundredths, 2);
        let in_range = (0..=10_000).contains(&hundredths);
        prop_assert_eq!(is_valid_health_score(score), in_range);
        prop_assert_eq!(validate_health_score(score).is_ok(), in_range);
    }

    #[test]
    fn prop_generated_lot_numbers_are_valid(lot in "[A-Z0-9_-]{1,50}") {
        prop_assert!(validate_lot_number(&lot).is_ok());
    }
}
