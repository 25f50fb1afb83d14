//! Dashboard summary

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan_readiness;
use crate::models::{HealthObservation, PlantLot, PlantStatus};

/// Days of health-log activity shown on the dashboard (including today)
pub const RECENT_ACTIVITY_DAYS: u64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCount {
    pub status: PlantStatus,
    pub lot_count: usize,
    pub plant_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZoneCount {
    pub zone_id: Uuid,
    pub lot_count: usize,
    pub plant_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardSummary {
    pub as_of: NaiveDate,
    pub total_lots: usize,
    pub total_plants: i64,
    /// One entry per status, zero-filled
    pub by_status: Vec<StatusCount>,
    pub by_zone: Vec<ZoneCount>,
    pub health_logs_last_7_days: usize,
    pub disease_detections_last_7_days: usize,
    pub horizon_days: u32,
    pub ready_within_horizon: usize,
}

/// Summarise lots and recent health activity for the dashboard
pub fn summarize_dashboard(
    lots: &[PlantLot],
    observations: &[HealthObservation],
    today: NaiveDate,
    horizon_days: u32,
) -> DashboardSummary {
    let mut by_status: Vec<StatusCount> = PlantStatus::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            lot_count: 0,
            plant_count: 0,
        })
        .collect();
    let mut by_zone: BTreeMap<Uuid, ZoneCount> = BTreeMap::new();

    for lot in lots {
        let plants = i64::from(lot.plant_count.max(0));
        if let Some(entry) = by_status.iter_mut().find(|s| s.status == lot.status) {
            entry.lot_count += 1;
            entry.plant_count += plants;
        }
        let zone = by_zone.entry(lot.zone_id).or_insert(ZoneCount {
            zone_id: lot.zone_id,
            lot_count: 0,
            plant_count: 0,
        });
        zone.lot_count += 1;
        zone.plant_count += plants;
    }

    let since = today
        .checked_sub_days(Days::new(RECENT_ACTIVITY_DAYS - 1))
        .unwrap_or(NaiveDate::MIN);
    let recent: Vec<&HealthObservation> = observations
        .iter()
        .filter(|o| {
            let day = o.recorded_at.date_naive();
            day >= since && day <= today
        })
        .collect();

    // A horizon past the calendar's end means nothing can be planned against it
    let ready_within_horizon = match today.checked_add_days(Days::new(u64::from(horizon_days))) {
        Some(target) => plan_readiness(lots, target).total_ready_lots,
        None => {
            tracing::warn!(horizon_days, "dashboard horizon is out of range");
            0
        }
    };

    DashboardSummary {
        as_of: today,
        total_lots: lots.len(),
        total_plants: lots.iter().map(|l| i64::from(l.plant_count.max(0))).sum(),
        by_status,
        by_zone: by_zone.into_values().collect(),
        health_logs_last_7_days: recent.len(),
        disease_detections_last_7_days: recent.iter().filter(|o| o.disease_detected).count(),
        horizon_days,
        ready_within_horizon,
    }
}
