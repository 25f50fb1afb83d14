//! Database models for the Plantation Management System
//!
//! Re-exports models from the shared crate and adds the row types sqlx maps
//! query results into.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

pub use shared::models::*;

use crate::error::{AppError, AppResult};

/// Column list matching [`PlantLotRow`]
pub const PLANT_LOT_COLUMNS: &str = "id, lot_number, species_id, zone_id, plant_count, planted_date, \
     expected_harvest_date, actual_harvest_date, status, current_yield, location_section, \
     location_row, location_column, notes, created_at, updated_at";

/// Column list matching [`HealthLogRow`]
pub const HEALTH_LOG_COLUMNS: &str = "id, plant_lot_id, recorded_at, recorded_by, health_status, \
     health_score, disease_detected, disease_type, disease_confidence, temperature_celsius, \
     humidity_percent, soil_moisture_percent, height_cm, leaf_count, flower_count, fruit_count, \
     images, notes, ai_analysis, created_at";

/// Column list matching [`SpeciesRow`]
pub const SPECIES_COLUMNS: &str = "id, name, scientific_name, growth_period_days, \
     expected_yield_per_plant, yield_unit, description, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ZoneRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub area_square_meters: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ZoneRow> for Zone {
    fn from(r: ZoneRow) -> Self {
        Zone {
            id: r.id,
            name: r.name,
            description: r.description,
            area_square_meters: r.area_square_meters,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SpeciesRow {
    pub id: Uuid,
    pub name: String,
    pub scientific_name: Option<String>,
    pub growth_period_days: i32,
    pub expected_yield_per_plant: Option<Decimal>,
    pub yield_unit: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SpeciesRow> for PlantSpecies {
    fn from(r: SpeciesRow) -> Self {
        PlantSpecies {
            id: r.id,
            name: r.name,
            scientific_name: r.scientific_name,
            growth_period_days: r.growth_period_days,
            expected_yield_per_plant: r.expected_yield_per_plant,
            yield_unit: r.yield_unit,
            description: r.description,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub zone_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(r: UserRow) -> AppResult<Self> {
        Ok(User {
            id: r.id,
            email: r.email,
            name: r.name,
            role: r.role.parse().map_err(AppError::Internal)?,
            zone_id: r.zone_id,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlantLotRow {
    pub id: Uuid,
    pub lot_number: String,
    pub species_id: Uuid,
    pub zone_id: Uuid,
    pub plant_count: i32,
    pub planted_date: NaiveDate,
    pub expected_harvest_date: Option<NaiveDate>,
    pub actual_harvest_date: Option<NaiveDate>,
    pub status: String,
    pub current_yield: Option<Decimal>,
    pub location_section: Option<String>,
    pub location_row: Option<i32>,
    pub location_column: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlantLotRow {
    /// Convert into the shared model, attaching the species when resolved
    pub fn into_lot(self, species: Option<PlantSpecies>) -> AppResult<PlantLot> {
        let location = match (self.location_section, self.location_row, self.location_column) {
            (Some(section), Some(row), Some(column)) => Some(PlantLocation {
                section,
                row,
                column,
            }),
            _ => None,
        };

        Ok(PlantLot {
            id: self.id,
            lot_number: self.lot_number,
            species_id: self.species_id,
            species,
            zone_id: self.zone_id,
            plant_count: self.plant_count,
            planted_date: self.planted_date,
            expected_harvest_date: self.expected_harvest_date,
            actual_harvest_date: self.actual_harvest_date,
            status: self.status.parse().map_err(AppError::Internal)?,
            current_yield: self.current_yield,
            location,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HealthLogRow {
    pub id: Uuid,
    pub plant_lot_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: Option<Uuid>,
    pub health_status: String,
    pub health_score: Option<Decimal>,
    pub disease_detected: bool,
    pub disease_type: Option<String>,
    pub disease_confidence: Option<Decimal>,
    pub temperature_celsius: Option<Decimal>,
    pub humidity_percent: Option<Decimal>,
    pub soil_moisture_percent: Option<Decimal>,
    pub height_cm: Option<Decimal>,
    pub leaf_count: Option<i32>,
    pub flower_count: Option<i32>,
    pub fruit_count: Option<i32>,
    pub images: Vec<String>,
    pub notes: Option<String>,
    pub ai_analysis: Option<Json<AiHealthAnalysis>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<HealthLogRow> for HealthObservation {
    type Error = AppError;

    fn try_from(r: HealthLogRow) -> AppResult<Self> {
        Ok(HealthObservation {
            id: r.id,
            plant_lot_id: r.plant_lot_id,
            recorded_at: r.recorded_at,
            recorded_by: r.recorded_by,
            health_status: r.health_status.parse().map_err(AppError::Internal)?,
            health_score: r.health_score,
            disease_detected: r.disease_detected,
            disease_type: r.disease_type,
            disease_confidence: r.disease_confidence,
            environment: EnvironmentalMetrics {
                temperature_celsius: r.temperature_celsius,
                humidity_percent: r.humidity_percent,
                soil_moisture_percent: r.soil_moisture_percent,
            },
            growth: GrowthMetrics {
                height_cm: r.height_cm,
                leaf_count: r.leaf_count,
                flower_count: r.flower_count,
                fruit_count: r.fruit_count,
            },
            images: r.images,
            notes: r.notes,
            ai_analysis: r.ai_analysis.map(|Json(a)| a),
            created_at: r.created_at,
        })
    }
}

/// Convert a batch of health log rows
pub fn observations_from_rows(rows: Vec<HealthLogRow>) -> AppResult<Vec<HealthObservation>> {
    rows.into_iter().map(HealthObservation::try_from).collect()
}
