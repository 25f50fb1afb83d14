//! Plant lot service

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{PaginatedResponse, Pagination};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{map_fk_violation, map_unique_violation, AppError, AppResult};
use crate::models::{
    HealthLogRow, HealthObservation, PlantLocation, PlantLot, PlantLotRow, PlantSpecies,
    PlantStatus, SpeciesRow, Zone, ZoneRow, HEALTH_LOG_COLUMNS, PLANT_LOT_COLUMNS,
    SPECIES_COLUMNS,
};

/// Plant lot service
#[derive(Clone)]
pub struct PlantLotService {
    db: PgPool,
}

/// Query filters for listing lots
#[derive(Debug, Default, Deserialize)]
pub struct LotFilter {
    pub zone_id: Option<Uuid>,
    pub species_id: Option<Uuid>,
    pub status: Option<PlantStatus>,
}

/// Input for creating a plant lot
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlantLotInput {
    pub lot_number: String,
    pub species_id: Uuid,
    pub zone_id: Uuid,
    #[validate(range(min = 1, message = "Plant count must be at least 1"))]
    pub plant_count: i32,
    pub planted_date: NaiveDate,
    pub expected_harvest_date: Option<NaiveDate>,
    pub status: Option<PlantStatus>,
    pub location: Option<PlantLocation>,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Input for updating a plant lot
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePlantLotInput {
    pub species_id: Option<Uuid>,
    pub zone_id: Option<Uuid>,
    #[validate(range(min = 1, message = "Plant count must be at least 1"))]
    pub plant_count: Option<i32>,
    pub planted_date: Option<NaiveDate>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub actual_harvest_date: Option<NaiveDate>,
    pub status: Option<PlantStatus>,
    pub current_yield: Option<Decimal>,
    pub location: Option<PlantLocation>,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// A lot resolved from a QR label
#[derive(Debug, Serialize)]
pub struct LotLookup {
    pub lot: PlantLot,
    pub zone: Zone,
    pub latest_health: Option<HealthObservation>,
}

impl PlantLotService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List lots, restricted to `zone_scope` when set
    pub async fn list_lots(
        &self,
        zone_scope: Option<Uuid>,
        filter: &LotFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<PlantLot>> {
        let zone_id = match (zone_scope, filter.zone_id) {
            (Some(own), Some(requested)) if own != requested => {
                return Err(AppError::Forbidden(
                    "Cannot list lots of another zone".to_string(),
                ))
            }
            (Some(own), _) => Some(own),
            (None, requested) => requested,
        };
        let status = filter.status.map(|s| s.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM plant_lots
            WHERE ($1::uuid IS NULL OR zone_id = $1)
              AND ($2::uuid IS NULL OR species_id = $2)
              AND ($3::text IS NULL OR status = $3)
            "#,
        )
        .bind(zone_id)
        .bind(filter.species_id)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, PlantLotRow>(&format!(
            r#"
            SELECT {} FROM plant_lots
            WHERE ($1::uuid IS NULL OR zone_id = $1)
              AND ($2::uuid IS NULL OR species_id = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY lot_number ASC
            LIMIT $4 OFFSET $5
            "#,
            PLANT_LOT_COLUMNS
        ))
        .bind(zone_id)
        .bind(filter.species_id)
        .bind(status)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: self.attach_species(rows).await?,
            pagination: pagination.meta(total.max(0) as u64),
        })
    }

    /// Every lot with its species resolved, for reporting
    pub async fn load_all_with_species(&self, zone_scope: Option<Uuid>) -> AppResult<Vec<PlantLot>> {
        let rows = sqlx::query_as::<_, PlantLotRow>(&format!(
            "SELECT {} FROM plant_lots WHERE ($1::uuid IS NULL OR zone_id = $1) ORDER BY lot_number ASC",
            PLANT_LOT_COLUMNS
        ))
        .bind(zone_scope)
        .fetch_all(&self.db)
        .await?;

        self.attach_species(rows).await
    }

    pub async fn get_lot(&self, lot_id: Uuid) -> AppResult<PlantLot> {
        let row = sqlx::query_as::<_, PlantLotRow>(&format!(
            "SELECT {} FROM plant_lots WHERE id = $1",
            PLANT_LOT_COLUMNS
        ))
        .bind(lot_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Plant lot".to_string()))?;

        self.attach_one(row).await
    }

    /// Resolve a lot number (from a QR label) to the lot, its zone and latest health log
    pub async fn lookup_by_lot_number(&self, lot_number: &str) -> AppResult<LotLookup> {
        let row = sqlx::query_as::<_, PlantLotRow>(&format!(
            "SELECT {} FROM plant_lots WHERE lot_number = $1",
            PLANT_LOT_COLUMNS
        ))
        .bind(lot_number)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Plant lot".to_string()))?;

        let lot = self.attach_one(row).await?;

        let zone: Zone = sqlx::query_as::<_, ZoneRow>(
            "SELECT id, name, description, area_square_meters, created_at, updated_at FROM zones WHERE id = $1",
        )
        .bind(lot.zone_id)
        .fetch_one(&self.db)
        .await?
        .into();

        let latest_health = sqlx::query_as::<_, HealthLogRow>(&format!(
            "SELECT {} FROM health_logs WHERE plant_lot_id = $1 ORDER BY recorded_at DESC LIMIT 1",
            HEALTH_LOG_COLUMNS
        ))
        .bind(lot.id)
        .fetch_optional(&self.db)
        .await?
        .map(HealthObservation::try_from)
        .transpose()?;

        Ok(LotLookup {
            lot,
            zone,
            latest_health,
        })
    }

    pub async fn create_lot(&self, input: CreatePlantLotInput) -> AppResult<PlantLot> {
        input.validate()?;
        shared::validate_lot_number(&input.lot_number)?;
        shared::validate_plant_count(input.plant_count)?;
        shared::validate_harvest_dates(input.planted_date, input.expected_harvest_date, None)?;

        let species = self.fetch_species(input.species_id).await?.ok_or_else(|| {
            AppError::validation("species_id", "Species does not exist")
        })?;
        self.ensure_zone_exists(input.zone_id).await?;

        // Default the expected harvest from the species growth period
        let expected_harvest_date = input.expected_harvest_date.or_else(|| {
            input
                .planted_date
                .checked_add_signed(chrono::Duration::days(i64::from(species.growth_period_days)))
        });
        let status = input.status.unwrap_or(PlantStatus::Seedling);
        let (section, row_no, column) = split_location(input.location);

        let row = sqlx::query_as::<_, PlantLotRow>(&format!(
            r#"
            INSERT INTO plant_lots (lot_number, species_id, zone_id, plant_count, planted_date,
                                    expected_harvest_date, status, location_section,
                                    location_row, location_column, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            PLANT_LOT_COLUMNS
        ))
        .bind(&input.lot_number)
        .bind(input.species_id)
        .bind(input.zone_id)
        .bind(input.plant_count)
        .bind(input.planted_date)
        .bind(expected_harvest_date)
        .bind(status.as_str())
        .bind(section)
        .bind(row_no)
        .bind(column)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "lot_number"))?;

        tracing::info!(lot_id = %row.id, lot_number = %row.lot_number, "plant lot created");
        row.into_lot(Some(species))
    }

    pub async fn update_lot(&self, lot_id: Uuid, input: UpdatePlantLotInput) -> AppResult<PlantLot> {
        input.validate()?;
        let existing = self.get_lot(lot_id).await?;

        let plant_count = input.plant_count.unwrap_or(existing.plant_count);
        shared::validate_plant_count(plant_count)?;
        let planted_date = input.planted_date.unwrap_or(existing.planted_date);
        let expected_harvest_date = input.expected_harvest_date.or(existing.expected_harvest_date);
        let actual_harvest_date = input.actual_harvest_date.or(existing.actual_harvest_date);
        shared::validate_harvest_dates(planted_date, expected_harvest_date, actual_harvest_date)?;
        if let Some(y) = input.current_yield {
            shared::validate_yield("current_yield", y)?;
        }

        let species_id = input.species_id.unwrap_or(existing.species_id);
        if species_id != existing.species_id && self.fetch_species(species_id).await?.is_none() {
            return Err(AppError::validation("species_id", "Species does not exist"));
        }
        let zone_id = input.zone_id.unwrap_or(existing.zone_id);
        if zone_id != existing.zone_id {
            self.ensure_zone_exists(zone_id).await?;
        }

        let status = input.status.unwrap_or(existing.status);
        let current_yield = input.current_yield.or(existing.current_yield);
        let (section, row_no, column) = split_location(input.location.or(existing.location));
        let notes = input.notes.or(existing.notes);

        let row = sqlx::query_as::<_, PlantLotRow>(&format!(
            r#"
            UPDATE plant_lots
            SET species_id = $1, zone_id = $2, plant_count = $3, planted_date = $4,
                expected_harvest_date = $5, actual_harvest_date = $6, status = $7,
                current_yield = $8, location_section = $9, location_row = $10,
                location_column = $11, notes = $12, updated_at = NOW()
            WHERE id = $13
            RETURNING {}
            "#,
            PLANT_LOT_COLUMNS
        ))
        .bind(species_id)
        .bind(zone_id)
        .bind(plant_count)
        .bind(planted_date)
        .bind(expected_harvest_date)
        .bind(actual_harvest_date)
        .bind(status.as_str())
        .bind(current_yield)
        .bind(section)
        .bind(row_no)
        .bind(column)
        .bind(&notes)
        .bind(lot_id)
        .fetch_one(&self.db)
        .await?;

        self.attach_one(row).await
    }

    /// Delete a lot; lots with health logs are rejected with a conflict
    pub async fn delete_lot(&self, lot_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM plant_lots WHERE id = $1")
            .bind(lot_id)
            .execute(&self.db)
            .await
            .map_err(|e| {
                map_fk_violation(e, "plant_lot", "Plant lot has health logs and cannot be deleted")
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Plant lot".to_string()));
        }
        tracing::info!(%lot_id, "plant lot deleted");
        Ok(())
    }

    async fn fetch_species(&self, species_id: Uuid) -> AppResult<Option<PlantSpecies>> {
        let row = sqlx::query_as::<_, SpeciesRow>(&format!(
            "SELECT {} FROM plant_species WHERE id = $1",
            SPECIES_COLUMNS
        ))
        .bind(species_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(PlantSpecies::from))
    }

    async fn ensure_zone_exists(&self, zone_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM zones WHERE id = $1")
            .bind(zone_id)
            .fetch_one(&self.db)
            .await?;

        if exists == 0 {
            return Err(AppError::validation("zone_id", "Zone does not exist"));
        }
        Ok(())
    }

    async fn attach_one(&self, row: PlantLotRow) -> AppResult<PlantLot> {
        let species = self.fetch_species(row.species_id).await?;
        row.into_lot(species)
    }

    /// Resolve species for a batch of lot rows with a single query
    async fn attach_species(&self, rows: Vec<PlantLotRow>) -> AppResult<Vec<PlantLot>> {
        let mut ids: Vec<Uuid> = rows.iter().map(|r| r.species_id).collect();
        ids.sort();
        ids.dedup();

        let species: HashMap<Uuid, PlantSpecies> = sqlx::query_as::<_, SpeciesRow>(&format!(
            "SELECT {} FROM plant_species WHERE id = ANY($1)",
            SPECIES_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|r| (r.id, PlantSpecies::from(r)))
        .collect();

        rows.into_iter()
            .map(|row| {
                let sp = species.get(&row.species_id).cloned();
                row.into_lot(sp)
            })
            .collect()
    }
}

fn split_location(location: Option<PlantLocation>) -> (Option<String>, Option<i32>, Option<i32>) {
    match location {
        Some(loc) => (Some(loc.section), Some(loc.row), Some(loc.column)),
        None => (None, None, None),
    }
}
