//! Reporting service: loads a snapshot and runs the shared analytics over it

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::analytics::{
    plan_readiness, summarize_dashboard, summarize_trends, DashboardSummary,
    DeliveryReadinessReport, HealthTrendReport, RECENT_ACTIVITY_DAYS,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::{HealthLogService, PlantLotService};

/// Analytics service
#[derive(Clone)]
pub struct AnalyticsService {
    lots: PlantLotService,
    health_logs: HealthLogService,
}

/// One CSV line of the readiness export
#[derive(Debug, Serialize)]
pub struct ReadinessCsvRow {
    pub lot_number: String,
    pub species: String,
    pub zone_id: Uuid,
    pub status: String,
    pub plant_count: i32,
    pub expected_harvest_date: NaiveDate,
    pub estimated_yield: Option<Decimal>,
    pub yield_unit: String,
}

impl AnalyticsService {
    pub fn new(db: PgPool, public_base_url: String) -> Self {
        Self {
            lots: PlantLotService::new(db.clone()),
            health_logs: HealthLogService::new(db, public_base_url),
        }
    }

    /// Which lots can be delivered by `target_date`
    pub async fn readiness(
        &self,
        target_date: NaiveDate,
        zone_scope: Option<Uuid>,
    ) -> AppResult<DeliveryReadinessReport> {
        let lots = self.lots.load_all_with_species(zone_scope).await?;
        let report = plan_readiness(&lots, target_date);

        tracing::info!(
            %target_date,
            ready_lots = report.total_ready_lots,
            total_plants = report.total_plants,
            "readiness report generated"
        );
        Ok(report)
    }

    /// Health trend report for one lot
    pub async fn lot_trends(
        &self,
        lot_id: Uuid,
        as_of: DateTime<Utc>,
        window_days: u32,
    ) -> AppResult<HealthTrendReport> {
        shared::validate_comparison_window(window_days)?;

        let observations = self.health_logs.list_by_lot(lot_id).await?;
        let mut report = summarize_trends(&observations, as_of, window_days);
        // Lots without history still report their id
        report.plant_lot_id.get_or_insert(lot_id);

        Ok(report)
    }

    pub async fn dashboard(
        &self,
        today: NaiveDate,
        horizon_days: u32,
        zone_scope: Option<Uuid>,
    ) -> AppResult<DashboardSummary> {
        let lots = self.lots.load_all_with_species(zone_scope).await?;

        let since = today
            .checked_sub_days(Days::new(RECENT_ACTIVITY_DAYS))
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .ok_or_else(|| AppError::Internal("Invalid dashboard date".to_string()))?;
        let observations = self.health_logs.list_since(since, zone_scope).await?;

        Ok(summarize_dashboard(&lots, &observations, today, horizon_days))
    }

    /// Flatten a readiness report into CSV rows
    pub fn readiness_rows(report: &DeliveryReadinessReport) -> Vec<ReadinessCsvRow> {
        let species: HashMap<Uuid, (&str, &str)> = report
            .species_breakdown
            .iter()
            .map(|s| (s.species_id, (s.species_name.as_str(), s.yield_unit.as_str())))
            .collect();

        report
            .ready_lots
            .iter()
            .map(|lot| {
                let (name, unit) = species.get(&lot.species_id).copied().unwrap_or(("", ""));
                ReadinessCsvRow {
                    lot_number: lot.lot_number.clone(),
                    species: name.to_string(),
                    zone_id: lot.zone_id,
                    status: lot.status.as_str().to_string(),
                    plant_count: lot.plant_count,
                    expected_harvest_date: lot.expected_harvest_date,
                    estimated_yield: lot.estimated_yield,
                    yield_unit: unit.to_string(),
                }
            })
            .collect()
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::analytics::{ReadyLot, SpeciesReadiness};
    use shared::PlantStatus;

    fn report() -> DeliveryReadinessReport {
        let species_id = Uuid::new_v4();
        let lot = ReadyLot {
            lot_id: Uuid::new_v4(),
            lot_number: "LOT-1".to_string(),
            species_id,
            zone_id: Uuid::nil(),
            status: PlantStatus::Mature,
            plant_count: 100,
            expected_harvest_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            estimated_yield: Some(Decimal::from(200)),
        };
        let orphan = ReadyLot {
            lot_number: "LOT-2".to_string(),
            species_id: Uuid::new_v4(),
            estimated_yield: None,
            ..lot.clone()
        };
        DeliveryReadinessReport {
            target_date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            ready_lots: vec![lot.clone(), orphan],
            species_breakdown: vec![SpeciesReadiness {
                species_id,
                species_name: "Durian".to_string(),
                yield_unit: "kg".to_string(),
                lots: vec![lot],
                total_plants: 100,
                total_estimated_yield: Decimal::from(200),
            }],
            total_ready_lots: 2,
            total_plants: 200,
            total_estimated_yield: Decimal::from(200),
            unassigned_lots: 1,
            unassigned_plants: 100,
            skipped_lots: 0,
        }
    }

    #[test]
    fn test_readiness_csv_export() {
        let rows = AnalyticsService::readiness_rows(&report());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].species, "Durian");
        assert_eq!(rows[1].species, "");

        let csv = AnalyticsService::export_to_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("lot_number,species,zone_id,status,plant_count,expected_harvest_date,estimated_yield,yield_unit")
        );
        assert!(lines.next().unwrap().starts_with("LOT-1,Durian,"));
        assert!(lines.next().unwrap().contains(",,"));
    }
}
