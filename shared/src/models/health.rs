//! Health log models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A point-in-time health record for one plant lot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthObservation {
    pub id: Uuid,
    pub plant_lot_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: Option<Uuid>,
    pub health_status: HealthStatus,
    /// Derived health score (0-100)
    pub health_score: Option<Decimal>,
    #[serde(default)]
    pub disease_detected: bool,
    pub disease_type: Option<String>,
    /// Detection confidence (0-1)
    pub disease_confidence: Option<Decimal>,
    #[serde(default)]
    pub environment: EnvironmentalMetrics,
    #[serde(default)]
    pub growth: GrowthMetrics,
    /// Opaque image references, resolved by the image storage
    #[serde(default)]
    pub images: Vec<String>,
    pub notes: Option<String>,
    /// Filled in later by the AI analysis service
    pub ai_analysis: Option<AiHealthAnalysis>,
    pub created_at: DateTime<Utc>,
}

impl HealthObservation {
    /// Health score, if present and within 0-100
    pub fn valid_score(&self) -> Option<Decimal> {
        match self.health_score {
            Some(score) if crate::validation::is_valid_health_score(score) => Some(score),
            Some(score) => {
                tracing::warn!(
                    observation_id = %self.id,
                    %score,
                    "health score out of range, ignoring"
                );
                None
            }
            None => None,
        }
    }
}

/// Ordered health category, worst first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Critical,
    Diseased,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 6] = [
        HealthStatus::Critical,
        HealthStatus::Diseased,
        HealthStatus::Poor,
        HealthStatus::Fair,
        HealthStatus::Good,
        HealthStatus::Excellent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Critical => "critical",
            HealthStatus::Diseased => "diseased",
            HealthStatus::Poor => "poor",
            HealthStatus::Fair => "fair",
            HealthStatus::Good => "good",
            HealthStatus::Excellent => "excellent",
        }
    }

    /// Statuses that call for isolating the affected plants
    pub fn needs_isolation(&self) -> bool {
        matches!(self, HealthStatus::Critical | HealthStatus::Diseased)
    }
}

impl std::str::FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HealthStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown health status: {}", s))
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Critical => write!(f, "Critical"),
            HealthStatus::Diseased => write!(f, "Diseased"),
            HealthStatus::Poor => write!(f, "Poor"),
            HealthStatus::Fair => write!(f, "Fair"),
            HealthStatus::Good => write!(f, "Good"),
            HealthStatus::Excellent => write!(f, "Excellent"),
        }
    }
}

/// Environmental readings taken with the observation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentalMetrics {
    pub temperature_celsius: Option<Decimal>,
    pub humidity_percent: Option<Decimal>,
    pub soil_moisture_percent: Option<Decimal>,
}

/// Growth measurements taken with the observation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GrowthMetrics {
    pub height_cm: Option<Decimal>,
    pub leaf_count: Option<i32>,
    pub flower_count: Option<i32>,
    pub fruit_count: Option<i32>,
}

/// Result of the external AI image analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiHealthAnalysis {
    pub request_id: String,
    pub health_score: Decimal,
    pub disease_detected: bool,
    pub disease_type: Option<String>,
    pub confidence: Decimal,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}
