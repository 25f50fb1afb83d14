//! WebAssembly module for the Plantation Management System
//!
//! Provides client-side computation for:
//! - Harvest readiness planning
//! - Health trend summaries and the dashboard
//! - QR label decoding and offline data validation
//!
//! Records cross the boundary as JSON strings in the same shape the REST API
//! returns them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::analytics::{percentage_change, plan_readiness, summarize_dashboard, summarize_trends};
use shared::qr::{lot_qr_url, parse_qr_payload};

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

/// Current time from the browser clock
fn browser_now() -> Result<DateTime<Utc>, String> {
    let iso = js_sys::Date::new_0()
        .to_iso_string()
        .as_string()
        .ok_or_else(|| "Browser clock unavailable".to_string())?;
    parse_timestamp(&iso)
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    value
        .parse::<NaiveDate>()
        .map_err(|e| format!("Invalid date '{}': {}", value, e))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp '{}': {}", value, e))
}

fn parse_json<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn readiness_report(lots_json: &str, target_date: &str) -> Result<String, String> {
    let lots: Vec<PlantLot> = parse_json("lots", lots_json)?;
    let report = plan_readiness(&lots, parse_date(target_date)?);
    to_json(&report)
}

fn trend_report(observations_json: &str, as_of: DateTime<Utc>, window_days: u32) -> Result<String, String> {
    validate_comparison_window(window_days).map_err(|e| e.to_string())?;
    let observations: Vec<HealthObservation> = parse_json("observations", observations_json)?;
    let report = summarize_trends(&observations, as_of, window_days);
    to_json(&report)
}

fn dashboard_report(
    lots_json: &str,
    observations_json: &str,
    today: &str,
    horizon_days: u32,
) -> Result<String, String> {
    validate_dashboard_horizon(horizon_days).map_err(|e| e.to_string())?;
    let lots: Vec<PlantLot> = parse_json("lots", lots_json)?;
    let observations: Vec<HealthObservation> = parse_json("observations", observations_json)?;
    let summary = summarize_dashboard(&lots, &observations, parse_date(today)?, horizon_days);
    to_json(&summary)
}

/// Plan which lots are deliverable by `target_date` (`YYYY-MM-DD`)
#[wasm_bindgen]
pub fn plan_readiness_json(lots_json: &str, target_date: &str) -> Result<String, JsValue> {
    readiness_report(lots_json, target_date).map_err(to_js_error)
}

/// Summarise a lot's health history; an empty `as_of` means now
#[wasm_bindgen]
pub fn summarize_trends_json(
    observations_json: &str,
    as_of: &str,
    window_days: u32,
) -> Result<String, JsValue> {
    let as_of = if as_of.trim().is_empty() {
        browser_now()
    } else {
        parse_timestamp(as_of)
    }
    .map_err(to_js_error)?;

    trend_report(observations_json, as_of, window_days).map_err(to_js_error)
}

#[wasm_bindgen]
pub fn summarize_dashboard_json(
    lots_json: &str,
    observations_json: &str,
    today: &str,
    horizon_days: u32,
) -> Result<String, JsValue> {
    dashboard_report(lots_json, observations_json, today, horizon_days).map_err(to_js_error)
}

/// Lot number encoded in a scanned QR payload
#[wasm_bindgen]
pub fn parse_qr_code(payload: &str) -> Option<String> {
    parse_qr_payload(payload)
}

/// URL to print on a lot label
#[wasm_bindgen]
pub fn lot_label_url(base_url: &str, lot_number: &str) -> String {
    lot_qr_url(base_url, lot_number)
}

/// Relative change between two mean scores, in percent
#[wasm_bindgen]
pub fn calculate_percentage_change(recent: f64, prior: f64) -> Option<f64> {
    let recent = Decimal::try_from(recent).ok()?;
    let prior = Decimal::try_from(prior).ok()?;
    percentage_change(recent, prior).and_then(|change| change.to_f64())
}

#[wasm_bindgen]
pub fn is_valid_plant_count(count: i32) -> bool {
    validate_plant_count(count).is_ok()
}

#[wasm_bindgen]
pub fn is_valid_lot_number(lot_number: &str) -> bool {
    validate_lot_number(lot_number).is_ok()
}

/// Check a health score entered offline (0-100)
#[wasm_bindgen]
pub fn is_valid_score(score: f64) -> bool {
    Decimal::try_from(score).is_ok_and(is_valid_health_score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qr_code() {
        assert_eq!(parse_qr_code("plantlot:LOT-1"), Some("LOT-1".to_string()));
        assert_eq!(parse_qr_code("hello world"), None);
    }

    #[test]
    fn test_percentage_change() {
        let change = calculate_percentage_change(59.0, 81.0).unwrap();
        assert!((change + 27.16).abs() < 0.001);
        assert_eq!(calculate_percentage_change(50.0, 0.0), None);
    }

    #[test]
    fn test_offline_validation() {
        assert!(is_valid_plant_count(12));
        assert!(!is_valid_plant_count(0));
        assert!(is_valid_lot_number("LOT-2024-001"));
        assert!(!is_valid_lot_number("lot 1"));
        assert!(is_valid_score(72.5));
        assert!(!is_valid_score(101.0));
        assert!(!is_valid_score(f64::NAN));
    }

    #[test]
    fn test_readiness_of_empty_lot_list() {
        let json = readiness_report("[]", "2024-07-01").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_ready_lots"], 0);
        assert_eq!(value["target_date"], "2024-07-01");
    }

    #[test]
    fn test_invalid_inputs_are_reported() {
        assert!(readiness_report("{", "2024-07-01").unwrap_err().contains("lots"));
        assert!(readiness_report("[]", "July").unwrap_err().contains("Invalid date"));
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_trends_of_empty_history() {
        let as_of = parse_timestamp("2024-06-01T00:00:00Z").unwrap();
        let json = trend_report("[]", as_of, 14).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["observation_count"], 0);
        assert_eq!(value["health_trend"]["direction"], "insufficient_data");
    }

    #[test]
    fn test_dashboard_of_empty_inputs() {
        let json = dashboard_report("[]", "[]", "2024-06-01", 30).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_lots"], 0);
        assert_eq!(value["by_status"].as_array().map(|a| a.len()), Some(7));
    }

    #[test]
    fn test_out_of_range_windows_are_rejected() {
        let as_of = parse_timestamp("2024-06-01T00:00:00Z").unwrap();
        let err = trend_report("[]", as_of, 0).unwrap_err();
        assert!(err.starts_with("window_days"));

        let err = dashboard_report("[]", "[]", "2024-06-01", u32::MAX).unwrap_err();
        assert!(err.starts_with("horizon_days"));
    }
}
