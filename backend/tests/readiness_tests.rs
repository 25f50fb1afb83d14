//! Harvest readiness planning tests
//!
//! Covers delivery readiness for a target date:
//! - Lots without an expected harvest date are never ready
//! - Harvested and dead lots never appear in a report
//! - Per-species plant totals reconcile with the grand total
//! - Estimated yield is plant count times yield per plant
//! - Lots whose yield overflows are skipped, not fatal

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::analytics::{estimate_lot_yield, plan_readiness};
use shared::{PlantLot, PlantSpecies, PlantStatus};
use uuid::Uuid;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn species(name: &str, yield_per_plant: Option<Decimal>) -> PlantSpecies {
    PlantSpecies {
        id: Uuid::new_v4(),
        name: name.to_string(),
        scientific_name: None,
        growth_period_days: 120,
        expected_yield_per_plant: yield_per_plant,
        yield_unit: "kg".to_string(),
        description: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn lot(
    plant_count: i32,
    harvest_in_days: Option<i64>,
    status: PlantStatus,
    species: Option<&PlantSpecies>,
) -> PlantLot {
    PlantLot {
        id: Uuid::new_v4(),
        lot_number: format!("LOT-{}", plant_count),
        species_id: species.map(|s| s.id).unwrap_or_else(Uuid::new_v4),
        species: species.cloned(),
        zone_id: Uuid::nil(),
        plant_count,
        planted_date: today() - Duration::days(90),
        expected_harvest_date: harvest_in_days.map(|d| today() + Duration::days(d)),
        actual_harvest_date: None,
        status,
        current_yield: None,
        location: None,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn status_strategy() -> impl Strategy<Value = PlantStatus> {
    prop::sample::select(PlantStatus::ALL.to_vec())
}

#[test]
fn test_only_lots_due_by_target_are_ready() {
    let durian = species("Durian", Some(Decimal::from(2)));
    let lots = vec![
        lot(100, Some(10), PlantStatus::Growing, Some(&durian)),
        lot(50, Some(40), PlantStatus::Growing, Some(&durian)),
    ];

    let report = plan_readiness(&lots, today() + Duration::days(30));

    assert_eq!(report.total_ready_lots, 1);
    assert_eq!(report.ready_lots[0].plant_count, 100);
    assert_eq!(report.species_breakdown.len(), 1);
    assert_eq!(report.species_breakdown[0].species_name, "Durian");
    assert_eq!(report.species_breakdown[0].total_plants, 100);
    assert_eq!(
        report.species_breakdown[0].total_estimated_yield,
        Decimal::from(200)
    );
    assert_eq!(report.total_estimated_yield, Decimal::from(200));
}

#[test]
fn test_target_date_is_inclusive() {
    let mango = species("Mango", Some(Decimal::ONE));
    let lots = vec![lot(10, Some(30), PlantStatus::Mature, Some(&mango))];

    let report = plan_readiness(&lots, today() + Duration::days(30));
    assert_eq!(report.total_ready_lots, 1);
}

#[test]
fn test_empty_input_gives_empty_report() {
    let report = plan_readiness(&[], today());
    assert!(report.is_empty());
    assert_eq!(report.total_plants, 0);
    assert_eq!(report.total_estimated_yield, Decimal::ZERO);
    assert!(report.species_breakdown.is_empty());
}

#[test]
fn test_species_without_yield_estimates_zero() {
    let rambutan = species("Rambutan", None);
    let lots = vec![lot(40, Some(1), PlantStatus::Mature, Some(&rambutan))];

    let report = plan_readiness(&lots, today() + Duration::days(5));
    assert_eq!(report.ready_lots[0].estimated_yield, Some(Decimal::ZERO));
    assert_eq!(report.species_breakdown[0].total_plants, 40);
}

#[test]
fn test_species_less_lot_is_unassigned() {
    let durian = species("Durian", Some(Decimal::from(2)));
    let lots = vec![
        lot(100, Some(1), PlantStatus::Mature, Some(&durian)),
        lot(30, Some(1), PlantStatus::Mature, None),
    ];

    let report = plan_readiness(&lots, today() + Duration::days(5));

    assert_eq!(report.total_ready_lots, 2);
    assert_eq!(report.total_plants, 130);
    assert_eq!(report.unassigned_lots, 1);
    assert_eq!(report.unassigned_plants, 30);
    assert_eq!(report.ready_lots[1].estimated_yield, None);
    assert_eq!(estimate_lot_yield(&lots[1]), None);
}

#[test]
fn test_invalid_plant_count_is_skipped() {
    let durian = species("Durian", Some(Decimal::from(2)));
    let lots = vec![
        lot(0, Some(1), PlantStatus::Mature, Some(&durian)),
        lot(-5, Some(1), PlantStatus::Mature, Some(&durian)),
        lot(10, Some(1), PlantStatus::Mature, Some(&durian)),
    ];

    let report = plan_readiness(&lots, today() + Duration::days(5));
    assert_eq!(report.skipped_lots, 2);
    assert_eq!(report.total_ready_lots, 1);
}

#[test]
fn test_breakdown_sorted_by_species_name() {
    let mango = species("Mango", Some(Decimal::ONE));
    let durian = species("Durian", Some(Decimal::ONE));
    let lots = vec![
        lot(10, Some(1), PlantStatus::Mature, Some(&mango)),
        lot(20, Some(1), PlantStatus::Mature, Some(&durian)),
        lot(30, Some(2), PlantStatus::Harvesting, Some(&mango)),
    ];

    let report = plan_readiness(&lots, today() + Duration::days(5));
    let names: Vec<&str> = report
        .species_breakdown
        .iter()
        .map(|s| s.species_name.as_str())
        .collect();
    assert_eq!(names, vec!["Durian", "Mango"]);
    assert_eq!(report.species_breakdown[1].lots.len(), 2);
    assert_eq!(report.species_breakdown[1].total_plants, 40);
}

#[test]
fn test_overflowing_yield_is_skipped_not_fatal() {
    let huge = species("Jackfruit", Some(Decimal::MAX / Decimal::TWO));
    let durian = species("Durian", Some(Decimal::from(2)));
    let lots = vec![
        lot(3, Some(1), PlantStatus::Mature, Some(&huge)),
        lot(10, Some(1), PlantStatus::Mature, Some(&durian)),
    ];

    let report = plan_readiness(&lots, today() + Duration::days(5));

    assert_eq!(report.skipped_lots, 1);
    assert_eq!(report.total_ready_lots, 1);
    assert_eq!(report.total_plants, 10);
    assert_eq!(report.total_estimated_yield, Decimal::from(20));
    assert_eq!(estimate_lot_yield(&lots[0]), None);
}

proptest! {
    #[test]
    fn prop_lots_without_harvest_date_never_ready(
        counts in prop::collection::vec(1i32..10_000, 0..20),
        status in status_strategy(),
        horizon in 0i64..1000,
    ) {
        let durian = species("Durian", Some(Decimal::from(3)));
        let lots: Vec<PlantLot> = counts
            .iter()
            .map(|&c| lot(c, None, status, Some(&durian)))
            .collect();

        let report = plan_readiness(&lots, today() + Duration::days(horizon));
        prop_assert!(report.ready_lots.is_empty());
        prop_assert_eq!(report.total_plants, 0);
    }

    #[test]
    fn prop_terminal_lots_never_ready(
        entries in prop::collection::vec((1i32..5_000, -100i64..100, status_strategy()), 0..30),
    ) {
        let durian = species("Durian", Some(Decimal::ONE));
        let lots: Vec<PlantLot> = entries
            .iter()
            .map(|&(c, d, s)| lot(c, Some(d), s, Some(&durian)))
            .collect();

        let report = plan_readiness(&lots, today() + Duration::days(50));
        prop_assert!(report.ready_lots.iter().all(|l| !l.status.is_terminal()));
    }

    #[test]
    fn prop_species_totals_reconcile(
        entries in prop::collection::vec((1i32..5_000, 0i64..60, 0usize..3), 0..30),
    ) {
        let catalogue = [
            species("Durian", Some(Decimal::from(2))),
            species("Mango", Some(Decimal::new(15, 1))),
        ];
        let lots: Vec<PlantLot> = entries
            .iter()
            .map(|&(c, d, pick)| lot(c, Some(d), PlantStatus::Growing, catalogue.get(pick)))
            .collect();

        let report = plan_readiness(&lots, today() + Duration::days(30));
        let per_species: i64 = report.species_breakdown.iter().map(|s| s.total_plants).sum();
        prop_assert_eq!(per_species + report.unassigned_plants, report.total_plants);

        let per_species_yield: Decimal = report
            .species_breakdown
            .iter()
            .map(|s| s.total_estimated_yield)
            .sum();
        prop_assert_eq!(per_species_yield, report.total_estimated_yield);
    }

    #[test]
    fn prop_estimated_yield_is_count_times_rate(
        count in 1i32..100_000,
        rate_cents in 0i64..100_000,
    ) {
        let rate = Decimal::new(rate_cents, 2);
        let jackfruit = species("Jackfruit", Some(rate));
        let l = lot(count, Some(0), PlantStatus::Mature, Some(&jackfruit));

        prop_assert_eq!(estimate_lot_yield(&l), Some(Decimal::from(count) * rate));
    }
}
