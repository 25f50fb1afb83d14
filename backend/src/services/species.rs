//! Plant species catalogue service

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{map_fk_violation, map_unique_violation, AppError, AppResult};
use crate::models::{PlantSpecies, SpeciesRow, SPECIES_COLUMNS};

/// Species service
#[derive(Clone)]
pub struct SpeciesService {
    db: PgPool,
}

/// Input for creating a species
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSpeciesInput {
    #[validate(length(min = 1, max = 100, message = "Species name must be 1-100 characters"))]
    pub name: String,
    pub scientific_name: Option<String>,
    pub growth_period_days: i32,
    pub expected_yield_per_plant: Option<Decimal>,
    #[validate(length(min = 1, max = 20, message = "Yield unit must be 1-20 characters"))]
    pub yield_unit: Option<String>,
    pub description: Option<String>,
}

/// Input for updating a species
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSpeciesInput {
    #[validate(length(min = 1, max = 100, message = "Species name must be 1-100 characters"))]
    pub name: Option<String>,
    pub scientific_name: Option<String>,
    pub growth_period_days: Option<i32>,
    pub expected_yield_per_plant: Option<Decimal>,
    #[validate(length(min = 1, max = 20, message = "Yield unit must be 1-20 characters"))]
    pub yield_unit: Option<String>,
    pub description: Option<String>,
}

impl SpeciesService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_species(&self) -> AppResult<Vec<PlantSpecies>> {
        let rows = sqlx::query_as::<_, SpeciesRow>(&format!(
            "SELECT {} FROM plant_species ORDER BY name ASC",
            SPECIES_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PlantSpecies::from).collect())
    }

    pub async fn get_species(&self, species_id: Uuid) -> AppResult<PlantSpecies> {
        sqlx::query_as::<_, SpeciesRow>(&format!(
            "SELECT {} FROM plant_species WHERE id = $1",
            SPECIES_COLUMNS
        ))
        .bind(species_id)
        .fetch_optional(&self.db)
        .await?
        .map(PlantSpecies::from)
        .ok_or_else(|| AppError::NotFound("Species".to_string()))
    }

    pub async fn create_species(&self, input: CreateSpeciesInput) -> AppResult<PlantSpecies> {
        input.validate()?;
        shared::validate_growth_period(input.growth_period_days)?;
        if let Some(y) = input.expected_yield_per_plant {
            shared::validate_yield("expected_yield_per_plant", y)?;
        }

        let row = sqlx::query_as::<_, SpeciesRow>(&format!(
            r#"
            INSERT INTO plant_species (name, scientific_name, growth_period_days,
                                       expected_yield_per_plant, yield_unit, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SPECIES_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(&input.scientific_name)
        .bind(input.growth_period_days)
        .bind(input.expected_yield_per_plant)
        .bind(input.yield_unit.as_deref().unwrap_or("kg"))
        .bind(&input.description)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "name"))?;

        tracing::info!(species_id = %row.id, name = %row.name, "species created");
        Ok(row.into())
    }

    pub async fn update_species(
        &self,
        species_id: Uuid,
        input: UpdateSpeciesInput,
    ) -> AppResult<PlantSpecies> {
        input.validate()?;
        if let Some(days) = input.growth_period_days {
            shared::validate_growth_period(days)?;
        }
        if let Some(y) = input.expected_yield_per_plant {
            shared::validate_yield("expected_yield_per_plant", y)?;
        }

        let existing = self.get_species(species_id).await?;

        let name = input.name.map(|n| n.trim().to_string()).unwrap_or(existing.name);
        let scientific_name = input.scientific_name.or(existing.scientific_name);
        let growth_period_days = input.growth_period_days.unwrap_or(existing.growth_period_days);
        let expected_yield = input
            .expected_yield_per_plant
            .or(existing.expected_yield_per_plant);
        let yield_unit = input.yield_unit.unwrap_or(existing.yield_unit);
        let description = input.description.or(existing.description);

        let row = sqlx::query_as::<_, SpeciesRow>(&format!(
            r#"
            UPDATE plant_species
            SET name = $1, scientific_name = $2, growth_period_days = $3,
                expected_yield_per_plant = $4, yield_unit = $5, description = $6,
                updated_at = NOW()
            WHERE id = $7
            RETURNING {}
            "#,
            SPECIES_COLUMNS
        ))
        .bind(&name)
        .bind(&scientific_name)
        .bind(growth_period_days)
        .bind(expected_yield)
        .bind(&yield_unit)
        .bind(&description)
        .bind(species_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "name"))?;

        Ok(row.into())
    }

    pub async fn delete_species(&self, species_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM plant_species WHERE id = $1")
            .bind(species_id)
            .execute(&self.db)
            .await
            .map_err(|e| map_fk_violation(e, "species", "Species is used by plant lots"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Species".to_string()));
        }
        Ok(())
    }
}
