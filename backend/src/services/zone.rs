//! Zone management service

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{map_fk_violation, map_unique_violation, AppError, AppResult};
use crate::models::{Zone, ZoneRow};

const ZONE_COLUMNS: &str = "id, name, description, area_square_meters, created_at, updated_at";

/// Zone service
#[derive(Clone)]
pub struct ZoneService {
    db: PgPool,
}

/// Input for creating a zone
#[derive(Debug, Deserialize, Validate)]
pub struct CreateZoneInput {
    #[validate(length(min = 1, max = 100, message = "Zone name must be 1-100 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub area_square_meters: Option<Decimal>,
}

/// Input for updating a zone
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateZoneInput {
    #[validate(length(min = 1, max = 100, message = "Zone name must be 1-100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub area_square_meters: Option<Decimal>,
}

fn validate_area(area: Option<Decimal>) -> AppResult<()> {
    if area.is_some_and(|a| a < Decimal::ZERO) {
        return Err(AppError::validation(
            "area_square_meters",
            "Area cannot be negative",
        ));
    }
    Ok(())
}

impl ZoneService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_zones(&self) -> AppResult<Vec<Zone>> {
        let rows = sqlx::query_as::<_, ZoneRow>(&format!(
            "SELECT {} FROM zones ORDER BY name ASC",
            ZONE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Zone::from).collect())
    }

    pub async fn get_zone(&self, zone_id: Uuid) -> AppResult<Zone> {
        sqlx::query_as::<_, ZoneRow>(&format!("SELECT {} FROM zones WHERE id = $1", ZONE_COLUMNS))
            .bind(zone_id)
            .fetch_optional(&self.db)
            .await?
            .map(Zone::from)
            .ok_or_else(|| AppError::NotFound("Zone".to_string()))
    }

    pub async fn create_zone(&self, input: CreateZoneInput) -> AppResult<Zone> {
        input.validate()?;
        validate_area(input.area_square_meters)?;

        let row = sqlx::query_as::<_, ZoneRow>(&format!(
            r#"
            INSERT INTO zones (name, description, area_square_meters)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            ZONE_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.area_square_meters)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "name"))?;

        tracing::info!(zone_id = %row.id, "zone created");
        Ok(row.into())
    }

    pub async fn update_zone(&self, zone_id: Uuid, input: UpdateZoneInput) -> AppResult<Zone> {
        input.validate()?;
        validate_area(input.area_square_meters)?;

        let existing = self.get_zone(zone_id).await?;

        let name = input.name.map(|n| n.trim().to_string()).unwrap_or(existing.name);
        let description = input.description.or(existing.description);
        let area = input.area_square_meters.or(existing.area_square_meters);

        let row = sqlx::query_as::<_, ZoneRow>(&format!(
            r#"
            UPDATE zones
            SET name = $1, description = $2, area_square_meters = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {}
            "#,
            ZONE_COLUMNS
        ))
        .bind(&name)
        .bind(&description)
        .bind(area)
        .bind(zone_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "name"))?;

        Ok(row.into())
    }

    /// Delete a zone; zones that still hold lots are rejected
    pub async fn delete_zone(&self, zone_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM zones WHERE id = $1")
            .bind(zone_id)
            .execute(&self.db)
            .await
            .map_err(|e| map_fk_violation(e, "zone", "Zone still contains plant lots"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Zone".to_string()));
        }
        Ok(())
    }
}
