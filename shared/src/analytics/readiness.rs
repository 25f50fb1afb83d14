//! Harvest readiness planning
//!
//! Answers "what can we deliver by this date?": selects lots whose expected
//! harvest falls on or before the target date and aggregates the expected
//! yield per species.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{PlantLot, PlantStatus};

/// A lot that will be harvest-ready by the target date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadyLot {
    pub lot_id: Uuid,
    pub lot_number: String,
    pub species_id: Uuid,
    pub zone_id: Uuid,
    pub status: PlantStatus,
    pub plant_count: i32,
    pub expected_harvest_date: NaiveDate,
    /// `plant_count × expected_yield_per_plant`; absent when the species is unresolved
    pub estimated_yield: Option<Decimal>,
}

/// Ready lots of one species
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeciesReadiness {
    pub species_id: Uuid,
    pub species_name: String,
    pub yield_unit: String,
    pub lots: Vec<ReadyLot>,
    pub total_plants: i64,
    pub total_estimated_yield: Decimal,
}

/// Which lots can be delivered by a target date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryReadinessReport {
    pub target_date: NaiveDate,
    pub ready_lots: Vec<ReadyLot>,
    pub species_breakdown: Vec<SpeciesReadiness>,
    pub total_ready_lots: usize,
    pub total_plants: i64,
    pub total_estimated_yield: Decimal,
    /// Ready lots left out of the breakdown because their species is unresolved
    pub unassigned_lots: usize,
    pub unassigned_plants: i64,
    /// Malformed lots ignored during planning
    pub skipped_lots: usize,
}

impl DeliveryReadinessReport {
    pub fn is_empty(&self) -> bool {
        self.ready_lots.is_empty()
    }
}

/// Whether a lot will be ready for delivery by `target_date` (inclusive)
pub fn is_ready_by(lot: &PlantLot, target_date: NaiveDate) -> bool {
    match lot.expected_harvest_date {
        Some(expected) => expected <= target_date && !lot.status.is_terminal(),
        None => false,
    }
}

/// Estimated yield of a lot, `None` without a resolved species or on overflow
pub fn estimate_lot_yield(lot: &PlantLot) -> Option<Decimal> {
    checked_lot_yield(lot).ok().flatten()
}

/// Like [`estimate_lot_yield`], but `Err(())` when the product overflows
fn checked_lot_yield(lot: &PlantLot) -> Result<Option<Decimal>, ()> {
    match &lot.species {
        Some(species) => Decimal::from(lot.plant_count)
            .checked_mul(species.effective_yield_per_plant())
            .map(Some)
            .ok_or(()),
        None => Ok(None),
    }
}

/// Plan which lots are harvest-ready by `target_date` and aggregate per species.
///
/// Lots without an expected harvest date are never ready. Ready lots whose
/// species is not resolved count toward `total_plants` but are reported in
/// `unassigned_*` rather than in the species breakdown. Lots with a
/// non-positive plant count, or whose yield does not fit a `Decimal`, are
/// counted in `skipped_lots`.
pub fn plan_readiness(lots: &[PlantLot], target_date: NaiveDate) -> DeliveryReadinessReport {
    let mut ready_lots = Vec::new();
    let mut skipped_lots = 0;

    // species_id -> index into `breakdown`
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut breakdown: Vec<SpeciesReadiness> = Vec::new();

    let mut unassigned_lots = 0;
    let mut unassigned_plants = 0i64;
    let mut total_estimated_yield = Decimal::ZERO;

    for lot in lots {
        if lot.plant_count < 1 {
            tracing::warn!(
                lot_id = %lot.id,
                plant_count = lot.plant_count,
                "skipping lot with invalid plant count"
            );
            skipped_lots += 1;
            continue;
        }
        if !is_ready_by(lot, target_date) {
            continue;
        }
        let Some(expected_harvest_date) = lot.expected_harvest_date else {
            continue;
        };
        let Ok(estimated_yield) = checked_lot_yield(lot) else {
            tracing::warn!(lot_id = %lot.id, "skipping lot whose estimated yield overflows");
            skipped_lots += 1;
            continue;
        };
        let grand_total = match estimated_yield {
            Some(y) => total_estimated_yield.checked_add(y),
            None => Some(total_estimated_yield),
        };
        let group_total = match (&lot.species, estimated_yield) {
            (Some(species), Some(y)) => index
                .get(&species.id)
                .map_or(Some(y), |&slot| breakdown[slot].total_estimated_yield.checked_add(y)),
            _ => Some(Decimal::ZERO),
        };
        let (Some(grand_total), Some(group_total)) = (grand_total, group_total) else {
            tracing::warn!(lot_id = %lot.id, "skipping lot whose yield overflows the report totals");
            skipped_lots += 1;
            continue;
        };
        total_estimated_yield = grand_total;

        let ready = ReadyLot {
            lot_id: lot.id,
            lot_number: lot.lot_number.clone(),
            species_id: lot.species_id,
            zone_id: lot.zone_id,
            status: lot.status,
            plant_count: lot.plant_count,
            expected_harvest_date,
            estimated_yield,
        };

        match (&lot.species, estimated_yield) {
            (Some(species), Some(_)) => {
                let slot = *index.entry(species.id).or_insert_with(|| {
                    breakdown.push(SpeciesReadiness {
                        species_id: species.id,
                        species_name: species.name.clone(),
                        yield_unit: species.yield_unit.clone(),
                        lots: Vec::new(),
                        total_plants: 0,
                        total_estimated_yield: Decimal::ZERO,
                    });
                    breakdown.len() - 1
                });
                let group = &mut breakdown[slot];
                group.total_plants += i64::from(lot.plant_count);
                group.total_estimated_yield = group_total;
                group.lots.push(ready.clone());
            }
            _ => {
                unassigned_lots += 1;
                unassigned_plants += i64::from(lot.plant_count);
            }
        }

        ready_lots.push(ready);
    }

    breakdown.sort_by(|a, b| {
        a.species_name
            .cmp(&b.species_name)
            .then_with(|| a.species_id.cmp(&b.species_id))
    });

    let total_plants = ready_lots.iter().map(|l| i64::from(l.plant_count)).sum();

    tracing::debug!(
        %target_date,
        ready = ready_lots.len(),
        species = breakdown.len(),
        skipped = skipped_lots,
        "planned harvest readiness"
    );

    DeliveryReadinessReport {
        target_date,
        total_ready_lots: ready_lots.len(),
        ready_lots,
        species_breakdown: breakdown,
        total_plants,
        total_estimated_yield,
        unassigned_lots,
        unassigned_plants,
        skipped_lots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlantSpecies;
    use chrono::{Duration, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn species(name: &str, yield_per_plant: Option<Decimal>) -> PlantSpecies {
        PlantSpecies {
            id: Uuid::new_v4(),
            name: name.to_string(),
            scientific_name: None,
            growth_period_days: 90,
            expected_yield_per_plant: yield_per_plant,
            yield_unit: "kg".to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn lot(count: i32, harvest_in_days: Option<i64>, status: PlantStatus, sp: Option<&PlantSpecies>) -> PlantLot {
        PlantLot {
            id: Uuid::new_v4(),
            lot_number: format!("LOT-{}", count),
            species_id: sp.map(|s| s.id).unwrap_or_else(Uuid::new_v4),
            species: sp.cloned(),
            zone_id: Uuid::new_v4(),
            plant_count: count,
            planted_date: today() - Duration::days(60),
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

    #[test]
    fn test_target_date_is_inclusive() {
        let sp = species("Mango", Some(Decimal::ONE));
        let lots = vec![lot(10, Some(30), PlantStatus::Mature, Some(&sp))];
        let report = plan_readiness(&lots, today() + Duration::days(30));
        assert_eq!(report.total_ready_lots, 1);
        let report = plan_readiness(&lots, today() + Duration::days(29));
        assert!(report.is_empty());
    }

    #[test]
    fn test_species_less_lot_counts_in_total_only() {
        let sp = species("Mango", Some(Decimal::TWO));
        let lots = vec![
            lot(10, Some(1), PlantStatus::Growing, Some(&sp)),
            lot(5, Some(1), PlantStatus::Growing, None),
        ];
        let report = plan_readiness(&lots, today() + Duration::days(7));

        assert_eq!(report.total_ready_lots, 2);
        assert_eq!(report.total_plants, 15);
        assert_eq!(report.unassigned_lots, 1);
        assert_eq!(report.unassigned_plants, 5);
        assert_eq!(report.species_breakdown.len(), 1);
        assert_eq!(report.species_breakdown[0].total_plants, 10);
        assert_eq!(report.total_estimated_yield, Decimal::from(20));
        assert_eq!(report.ready_lots[1].estimated_yield, None);
    }

    #[test]
    fn test_invalid_plant_count_is_skipped() {
        let sp = species("Mango", Some(Decimal::ONE));
        let lots = vec![
            lot(0, Some(1), PlantStatus::Growing, Some(&sp)),
            lot(3, Some(1), PlantStatus::Growing, Some(&sp)),
        ];
        let report = plan_readiness(&lots, today() + Duration::days(7));
        assert_eq!(report.skipped_lots, 1);
        assert_eq!(report.total_plants, 3);
    }

    #[test]
    fn test_breakdown_sorted_by_species_name() {
        let papaya = species("Papaya", None);
        let banana = species("Banana", Some(Decimal::ONE));
        let lots = vec![
            lot(4, Some(1), PlantStatus::Mature, Some(&papaya)),
            lot(6, Some(1), PlantStatus::Mature, Some(&banana)),
        ];
        let report = plan_readiness(&lots, today() + Duration::days(1));
        let names: Vec<_> = report
            .species_breakdown
            .iter()
            .map(|s| s.species_name.as_str())
            .collect();
        assert_eq!(names, vec!["Banana", "Papaya"]);
        assert_eq!(report.species_breakdown[1].total_estimated_yield, Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_lot_yield_is_skipped() {
        let huge = species("Jackfruit", Some(Decimal::MAX / Decimal::TWO));
        let small = species("Mango", Some(Decimal::ONE));
        let lots = vec![
            lot(3, Some(1), PlantStatus::Mature, Some(&huge)),
            lot(5, Some(1), PlantStatus::Mature, Some(&small)),
        ];
        let report = plan_readiness(&lots, today() + Duration::days(7));

        assert_eq!(report.skipped_lots, 1);
        assert_eq!(report.total_ready_lots, 1);
        assert_eq!(report.total_estimated_yield, Decimal::from(5));
    }

    #[test]
    fn test_overflowing_group_total_skips_later_lot() {
        let third = species("Jackfruit", Some(Decimal::MAX / Decimal::from(3)));
        let lots = vec![
            lot(2, Some(1), PlantStatus::Mature, Some(&third)),
            lot(2, Some(1), PlantStatus::Mature, Some(&third)),
            lot(1, Some(1), PlantStatus::Mature, Some(&third)),
        ];
        let report = plan_readiness(&lots, today() + Duration::days(7));

        assert_eq!(report.total_ready_lots, 2);
        assert_eq!(report.skipped_lots, 1);
        assert_eq!(report.species_breakdown[0].lots.len(), 2);
        assert_eq!(report.total_estimated_yield, Decimal::MAX);
        assert_eq!(
            report.species_breakdown[0].total_estimated_yield,
            report.total_estimated_yield
        );
    }
}
