//! Plant species models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cultivar definition shared across many plant lots
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantSpecies {
    pub id: Uuid,
    pub name: String,
    pub scientific_name: Option<String>,
    /// Days from planting to harvest
    pub growth_period_days: i32,
    /// Expected yield per plant, in `yield_unit`
    pub expected_yield_per_plant: Option<Decimal>,
    /// Unit of yield (e.g. "kg")
    pub yield_unit: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlantSpecies {
    /// Yield per plant usable for estimation.
    ///
    /// Missing or negative values count as zero.
    pub fn effective_yield_per_plant(&self) -> Decimal {
        match self.expected_yield_per_plant {
            Some(value) if value >= Decimal::ZERO => value,
            Some(value) => {
                tracing::warn!(
                    species_id = %self.id,
                    %value,
                    "negative expected yield per plant, treating as zero"
                );
                Decimal::ZERO
            }
            None => Decimal::ZERO,
        }
    }
}
