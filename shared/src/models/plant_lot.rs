//! Plant lot models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PlantSpecies;

/// A tracked batch of plants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantLot {
    pub id: Uuid,
    /// Human-readable lot code (e.g. "LOT-2024-001"), encoded in QR labels
    pub lot_number: String,
    pub species_id: Uuid,
    /// Resolved species relation, when the caller joined it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<PlantSpecies>,
    pub zone_id: Uuid,
    /// Number of plants in the lot (always >= 1 for valid lots)
    pub plant_count: i32,
    pub planted_date: NaiveDate,
    pub expected_harvest_date: Option<NaiveDate>,
    pub actual_harvest_date: Option<NaiveDate>,
    pub status: PlantStatus,
    /// Current yield in the species' yield unit
    pub current_yield: Option<Decimal>,
    pub location: Option<PlantLocation>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlantLot {
    /// Whether the lot has left the field for good
    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Lifecycle status of a plant lot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PlantStatus {
    Seedling,
    Growing,
    Mature,
    Harvesting,
    Harvested,
    Diseased,
    Dead,
}

impl PlantStatus {
    pub const ALL: [PlantStatus; 7] = [
        PlantStatus::Seedling,
        PlantStatus::Growing,
        PlantStatus::Mature,
        PlantStatus::Harvesting,
        PlantStatus::Harvested,
        PlantStatus::Diseased,
        PlantStatus::Dead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlantStatus::Seedling => "seedling",
            PlantStatus::Growing => "growing",
            PlantStatus::Mature => "mature",
            PlantStatus::Harvesting => "harvesting",
            PlantStatus::Harvested => "harvested",
            PlantStatus::Diseased => "diseased",
            PlantStatus::Dead => "dead",
        }
    }

    /// Harvested and dead lots can never be delivered again
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlantStatus::Harvested | PlantStatus::Dead)
    }
}

impl std::str::FromStr for PlantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlantStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown plant status: {}", s))
    }
}

impl std::fmt::Display for PlantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlantStatus::Seedling => write!(f, "Seedling"),
            PlantStatus::Growing => write!(f, "Growing"),
            PlantStatus::Mature => write!(f, "Mature"),
            PlantStatus::Harvesting => write!(f, "Harvesting"),
            PlantStatus::Harvested => write!(f, "Harvested"),
            PlantStatus::Diseased => write!(f, "Diseased"),
            PlantStatus::Dead => write!(f, "Dead"),
        }
    }
}

/// Physical position of a lot inside its zone
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlantLocation {
    pub section: String,
    pub row: i32,
    pub column: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_str() {
        for status in PlantStatus::ALL {
            assert_eq!(status.as_str().parse::<PlantStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("flowering".parse::<PlantStatus>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(PlantStatus::Harvested.is_terminal());
        assert!(PlantStatus::Dead.is_terminal());
        assert!(!PlantStatus::Diseased.is_terminal());
        assert!(!PlantStatus::Harvesting.is_terminal());
    }
}
