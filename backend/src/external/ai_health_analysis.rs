//! AI Health Analysis Client
//!
//! Client for the external plant health image analysis service.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::AiHealthAnalysis;
use uuid::Uuid;

use crate::config::AiAnalysisConfig;
use crate::error::{AppError, AppResult};

/// Client for the AI health analysis service
#[derive(Clone)]
pub struct AiHealthAnalysisClient {
    api_endpoint: String,
    api_key: String,
    http_client: Client,
}

/// Request to analyse the images of one health log
#[derive(Debug, Serialize)]
pub struct AnalyzeHealthRequest {
    pub health_log_id: Uuid,
    pub plant_lot_id: Uuid,
    pub image_urls: Vec<String>,
}

/// Response from the analysis API
#[derive(Debug, Deserialize)]
pub struct AnalyzeHealthResponse {
    pub request_id: String,
    pub health_score: Decimal,
    pub disease_detected: bool,
    pub disease_type: Option<String>,
    pub confidence: Decimal,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl From<AnalyzeHealthResponse> for AiHealthAnalysis {
    fn from(r: AnalyzeHealthResponse) -> Self {
        AiHealthAnalysis {
            request_id: r.request_id,
            health_score: r.health_score,
            disease_detected: r.disease_detected,
            disease_type: r.disease_type,
            confidence: r.confidence,
            recommendations: r.recommendations,
            analyzed_at: Utc::now(),
        }
    }
}

impl AiHealthAnalysisClient {
    /// Create a client from configuration; `None` when the service is not configured
    pub fn from_config(config: &AiAnalysisConfig) -> AppResult<Option<Self>> {
        if !config.is_enabled() {
            return Ok(None);
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Some(Self {
            api_endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            http_client,
        }))
    }

    /// Send images for analysis
    pub async fn analyze(&self, request: &AnalyzeHealthRequest) -> AppResult<AiHealthAnalysis> {
        tracing::debug!(
            health_log_id = %request.health_log_id,
            images = request.image_urls.len(),
            "requesting AI health analysis"
        );

        let response = self
            .http_client
            .post(&self.api_endpoint)
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::AiAnalysisError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::AiAnalysisError(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let result: AnalyzeHealthResponse = response
            .json()
            .await
            .map_err(|e| AppError::AiAnalysisError(format!("Failed to parse response: {}", e)))?;

        Ok(result.into())
    }
}
