//! Validation utilities for the Plantation Management System
//!
//! These checks run at the boundary (request handling, WASM entry points)
//! so that the analytics core only ever sees well-formed records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// A rejected input value
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

pub type ValidationResult = Result<(), ValidationError>;

/// Longest comparison window accepted for trend reports
pub const MAX_COMPARISON_WINDOW_DAYS: u32 = 365;

/// Furthest readiness horizon accepted for the dashboard
pub const MAX_DASHBOARD_HORIZON_DAYS: u32 = 3650;

// ============================================================================
// Plant Lot Validations
// ============================================================================

/// Validate that a lot holds at least one plant
pub fn validate_plant_count(count: i32) -> ValidationResult {
    if count < 1 {
        return Err(ValidationError::new(
            "plant_count",
            "Plant count must be at least 1",
        ));
    }
    Ok(())
}

/// Validate lot number format (1-50 chars of A-Z, 0-9, '-' or '_')
pub fn validate_lot_number(lot_number: &str) -> ValidationResult {
    if lot_number.is_empty() {
        return Err(ValidationError::new("lot_number", "Lot number cannot be empty"));
    }
    if lot_number.len() > 50 {
        return Err(ValidationError::new(
            "lot_number",
            "Lot number must be at most 50 characters",
        ));
    }
    if !lot_number
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::new(
            "lot_number",
            "Lot number may only contain letters, digits, '-' and '_'",
        ));
    }
    Ok(())
}

/// Validate that harvest dates do not precede planting
pub fn validate_harvest_dates(
    planted: NaiveDate,
    expected_harvest: Option<NaiveDate>,
    actual_harvest: Option<NaiveDate>,
) -> ValidationResult {
    if expected_harvest.is_some_and(|d| d < planted) {
        return Err(ValidationError::new(
            "expected_harvest_date",
            "Expected harvest date cannot be before the planted date",
        ));
    }
    if actual_harvest.is_some_and(|d| d < planted) {
        return Err(ValidationError::new(
            "actual_harvest_date",
            "Actual harvest date cannot be before the planted date",
        ));
    }
    Ok(())
}

/// Validate a yield value (current yield or expected yield per plant)
pub fn validate_yield(field: &'static str, value: Decimal) -> ValidationResult {
    if value < Decimal::ZERO {
        return Err(ValidationError::new(field, "Yield cannot be negative"));
    }
    Ok(())
}

// ============================================================================
// Species Validations
// ============================================================================

/// Validate growth period length in days
pub fn validate_growth_period(days: i32) -> ValidationResult {
    if days < 0 {
        return Err(ValidationError::new(
            "growth_period_days",
            "Growth period cannot be negative",
        ));
    }
    Ok(())
}

// ============================================================================
// Health Log Validations
// ============================================================================

/// Check a health score is within 0-100
pub fn is_valid_health_score(score: Decimal) -> bool {
    score >= Decimal::ZERO && score <= Decimal::ONE_HUNDRED
}

/// Validate a health score is within 0-100
pub fn validate_health_score(score: Decimal) -> ValidationResult {
    if !is_valid_health_score(score) {
        return Err(ValidationError::new(
            "health_score",
            "Health score must be between 0 and 100",
        ));
    }
    Ok(())
}

/// Validate a detection confidence is within 0-1
pub fn validate_confidence(confidence: Decimal) -> ValidationResult {
    if confidence < Decimal::ZERO || confidence > Decimal::ONE {
        return Err(ValidationError::new(
            "disease_confidence",
            "Confidence must be between 0 and 1",
        ));
    }
    Ok(())
}

/// Validate a percentage reading (humidity, soil moisture)
pub fn validate_percentage(field: &'static str, value: Decimal) -> ValidationResult {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new(field, "Percentage must be between 0 and 100"));
    }
    Ok(())
}

/// Validate a trend comparison window
pub fn validate_comparison_window(days: u32) -> ValidationResult {
    if days == 0 || days > MAX_COMPARISON_WINDOW_DAYS {
        return Err(ValidationError::new(
            "window_days",
            "Comparison window must be between 1 and 365 days",
        ));
    }
    Ok(())
}

/// Validate the dashboard's harvest readiness horizon
pub fn validate_dashboard_horizon(days: u32) -> ValidationResult {
    if days > MAX_DASHBOARD_HORIZON_DAYS {
        return Err(ValidationError::new(
            "horizon_days",
            "Dashboard horizon must be between 0 and 3650 days",
        ));
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> ValidationResult {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err(ValidationError::new("email", "Invalid email format"))
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> ValidationResult {
    if password.len() < 8 {
        return Err(ValidationError::new(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    Ok(())
}
