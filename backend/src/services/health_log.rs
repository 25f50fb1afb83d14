//! Health log service
//!
//! Health logs are append-only. The only mutation after creation is the AI
//! enrichment, which stores the analysis record and fills a missing score.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::images::absolutize_image_url;
use shared::{PaginatedResponse, Pagination};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    observations_from_rows, AiHealthAnalysis, EnvironmentalMetrics, GrowthMetrics,
    HealthLogRow, HealthObservation, HealthStatus, HEALTH_LOG_COLUMNS,
};

/// Health log service
#[derive(Clone)]
pub struct HealthLogService {
    db: PgPool,
    public_base_url: String,
}

/// Query filters for listing health logs
#[derive(Debug, Default, Deserialize)]
pub struct HealthLogFilter {
    pub plant_lot_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub disease_detected: Option<bool>,
}

/// Input for recording a health log
#[derive(Debug, Deserialize, Validate)]
pub struct CreateHealthLogInput {
    pub plant_lot_id: Uuid,
    /// Defaults to now
    pub recorded_at: Option<DateTime<Utc>>,
    pub health_status: HealthStatus,
    pub health_score: Option<Decimal>,
    #[serde(default)]
    pub disease_detected: bool,
    #[validate(length(max = 100, message = "Disease type must be at most 100 characters"))]
    pub disease_type: Option<String>,
    pub disease_confidence: Option<Decimal>,
    #[serde(default)]
    pub environment: EnvironmentalMetrics,
    #[serde(default)]
    pub growth: GrowthMetrics,
    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 images per health log"))]
    pub images: Vec<String>,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

impl CreateHealthLogInput {
    /// Domain checks on the measured values
    pub fn validate_readings(&self) -> AppResult<()> {
        self.validate()?;
        if let Some(score) = self.health_score {
            shared::validate_health_score(score)?;
        }
        if let Some(confidence) = self.disease_confidence {
            shared::validate_confidence(confidence)?;
        }
        if let Some(h) = self.environment.humidity_percent {
            shared::validate_percentage("humidity_percent", h)?;
        }
        if let Some(m) = self.environment.soil_moisture_percent {
            shared::validate_percentage("soil_moisture_percent", m)?;
        }
        if !self.disease_detected && self.disease_type.is_some() {
            return Err(AppError::validation(
                "disease_type",
                "Disease type requires disease_detected",
            ));
        }
        for count in [self.growth.leaf_count, self.growth.flower_count, self.growth.fruit_count]
            .into_iter()
            .flatten()
        {
            if count < 0 {
                return Err(AppError::validation("growth", "Counts cannot be negative"));
            }
        }
        Ok(())
    }
}

/// Reject AI output outside the accepted ranges
pub fn validate_ai_analysis(analysis: &AiHealthAnalysis) -> AppResult<()> {
    if !shared::is_valid_health_score(analysis.health_score) {
        return Err(AppError::AiAnalysisError(format!(
            "health score {} out of range",
            analysis.health_score
        )));
    }
    if shared::validate_confidence(analysis.confidence).is_err() {
        return Err(AppError::AiAnalysisError(format!(
            "confidence {} out of range",
            analysis.confidence
        )));
    }
    Ok(())
}

impl HealthLogService {
    pub fn new(db: PgPool, public_base_url: String) -> Self {
        Self {
            db,
            public_base_url,
        }
    }

    /// Rewrite stored image references to absolute URLs for the response
    fn present(&self, mut observation: HealthObservation) -> HealthObservation {
        observation.images = observation
            .images
            .iter()
            .map(|r| absolutize_image_url(&self.public_base_url, r))
            .collect();
        observation
    }

    fn present_all(&self, rows: Vec<HealthLogRow>) -> AppResult<Vec<HealthObservation>> {
        Ok(observations_from_rows(rows)?
            .into_iter()
            .map(|o| self.present(o))
            .collect())
    }

    pub async fn list_health_logs(
        &self,
        zone_scope: Option<Uuid>,
        filter: &HealthLogFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<HealthObservation>> {
        let where_clause = r#"
            WHERE ($1::uuid IS NULL OR h.plant_lot_id = $1)
              AND ($2::timestamptz IS NULL OR h.recorded_at >= $2)
              AND ($3::timestamptz IS NULL OR h.recorded_at <= $3)
              AND ($4::bool IS NULL OR h.disease_detected = $4)
              AND ($5::uuid IS NULL OR l.zone_id = $5)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM health_logs h JOIN plant_lots l ON l.id = h.plant_lot_id {}",
            where_clause
        ))
        .bind(filter.plant_lot_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.disease_detected)
        .bind(zone_scope)
        .fetch_one(&self.db)
        .await?;

        let columns = joined_columns();

        let rows = sqlx::query_as::<_, HealthLogRow>(&format!(
            r#"
            SELECT {} FROM health_logs h
            JOIN plant_lots l ON l.id = h.plant_lot_id
            {}
            ORDER BY h.recorded_at DESC
            LIMIT $6 OFFSET $7
            "#,
            columns, where_clause
        ))
        .bind(filter.plant_lot_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.disease_detected)
        .bind(zone_scope)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: self.present_all(rows)?,
            pagination: pagination.meta(total.max(0) as u64),
        })
    }

    /// A single health log; logs outside `zone_scope` are reported as not found
    pub async fn get_health_log(
        &self,
        log_id: Uuid,
        zone_scope: Option<Uuid>,
    ) -> AppResult<HealthObservation> {
        let row = self.fetch_row(log_id, zone_scope).await?;
        Ok(self.present(row.try_into()?))
    }

    /// Full history of one lot, oldest first
    pub async fn list_by_lot(&self, lot_id: Uuid) -> AppResult<Vec<HealthObservation>> {
        let rows = sqlx::query_as::<_, HealthLogRow>(&format!(
            "SELECT {} FROM health_logs WHERE plant_lot_id = $1 ORDER BY recorded_at ASC",
            HEALTH_LOG_COLUMNS
        ))
        .bind(lot_id)
        .fetch_all(&self.db)
        .await?;

        self.present_all(rows)
    }

    /// Health logs recorded since `since`, across the visible lots
    pub async fn list_since(
        &self,
        since: DateTime<Utc>,
        zone_scope: Option<Uuid>,
    ) -> AppResult<Vec<HealthObservation>> {
        let columns = joined_columns();

        let rows = sqlx::query_as::<_, HealthLogRow>(&format!(
            r#"
            SELECT {} FROM health_logs h
            JOIN plant_lots l ON l.id = h.plant_lot_id
            WHERE h.recorded_at >= $1
              AND ($2::uuid IS NULL OR l.zone_id = $2)
            ORDER BY h.recorded_at ASC
            "#,
            columns
        ))
        .bind(since)
        .bind(zone_scope)
        .fetch_all(&self.db)
        .await?;

        observations_from_rows(rows)
    }

    pub async fn create_health_log(
        &self,
        recorded_by: Uuid,
        input: CreateHealthLogInput,
    ) -> AppResult<HealthObservation> {
        input.validate_readings()?;

        let recorded_at = input.recorded_at.unwrap_or_else(Utc::now);
        if recorded_at > Utc::now() + chrono::Duration::minutes(5) {
            return Err(AppError::validation(
                "recorded_at",
                "Health log cannot be recorded in the future",
            ));
        }

        let row = sqlx::query_as::<_, HealthLogRow>(&format!(
            r#"
            INSERT INTO health_logs (plant_lot_id, recorded_at, recorded_by, health_status,
                                     health_score, disease_detected, disease_type,
                                     disease_confidence, temperature_celsius, humidity_percent,
                                     soil_moisture_percent, height_cm, leaf_count, flower_count,
                                     fruit_count, images, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {}
            "#,
            HEALTH_LOG_COLUMNS
        ))
        .bind(input.plant_lot_id)
        .bind(recorded_at)
        .bind(recorded_by)
        .bind(input.health_status.as_str())
        .bind(input.health_score)
        .bind(input.disease_detected)
        .bind(&input.disease_type)
        .bind(input.disease_confidence)
        .bind(input.environment.temperature_celsius)
        .bind(input.environment.humidity_percent)
        .bind(input.environment.soil_moisture_percent)
        .bind(input.growth.height_cm)
        .bind(input.growth.leaf_count)
        .bind(input.growth.flower_count)
        .bind(input.growth.fruit_count)
        .bind(&input.images)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            health_log_id = %row.id,
            plant_lot_id = %row.plant_lot_id,
            disease_detected = row.disease_detected,
            "health log recorded"
        );
        Ok(self.present(row.try_into()?))
    }

    /// Store an AI analysis; the score is only filled when none was recorded
    pub async fn apply_ai_analysis(
        &self,
        log_id: Uuid,
        analysis: &AiHealthAnalysis,
    ) -> AppResult<HealthObservation> {
        validate_ai_analysis(analysis)?;

        let row = sqlx::query_as::<_, HealthLogRow>(&format!(
            r#"
            UPDATE health_logs
            SET ai_analysis = $1,
                health_score = COALESCE(health_score, $2)
            WHERE id = $3
            RETURNING {}
            "#,
            HEALTH_LOG_COLUMNS
        ))
        .bind(Json(analysis))
        .bind(analysis.health_score)
        .bind(log_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Health log".to_string()))?;

        tracing::info!(
            health_log_id = %log_id,
            request_id = %analysis.request_id,
            "AI analysis stored"
        );
        Ok(self.present(row.try_into()?))
    }

    async fn fetch_row(&self, log_id: Uuid, zone_scope: Option<Uuid>) -> AppResult<HealthLogRow> {
        sqlx::query_as::<_, HealthLogRow>(&scoped_fetch_sql())
            .bind(log_id)
            .bind(zone_scope)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Health log".to_string()))
    }
}

/// `HEALTH_LOG_COLUMNS` qualified with the `h` alias for joins
fn joined_columns() -> String {
    HEALTH_LOG_COLUMNS
        .split(", ")
        .map(|c| format!("h.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn scoped_fetch_sql() -> String {
    format!(
        r#"
        SELECT {} FROM health_logs h
        JOIN plant_lots l ON l.id = h.plant_lot_id
        WHERE h.id = $1
          AND ($2::uuid IS NULL OR l.zone_id = $2)
        "#,
        joined_columns()
    )
}
