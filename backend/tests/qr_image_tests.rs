//! QR label and image URL tests
//!
//! - Decoded QR payloads resolve to lot numbers
//! - Relative image references are joined to the public base URL

use proptest::prelude::*;
use shared::images::{absolutize_all, absolutize_image_url, is_relative};
use shared::qr::{lot_qr_url, parse_qr_payload};

const BASE: &str = "https://farm.example";

#[test]
fn test_bare_lot_number() {
    assert_eq!(parse_qr_payload("LOT-2024-001"), Some("LOT-2024-001".to_string()));
    assert_eq!(parse_qr_payload("  LOT-7  "), Some("LOT-7".to_string()));
}

#[test]
fn test_prefixed_payload() {
    assert_eq!(parse_qr_payload("plantlot:LOT-9"), Some("LOT-9".to_string()));
    assert_eq!(parse_qr_payload("PlantLot:LOT-9"), Some("LOT-9".to_string()));
}

#[test]
fn test_url_payload() {
    assert_eq!(
        parse_qr_payload("https://farm.example/lots/LOT-3?src=label#top"),
        Some("LOT-3".to_string())
    );
    assert_eq!(
        parse_qr_payload("https://farm.example/lots/LOT-3/health"),
        Some("LOT-3".to_string())
    );
}

#[test]
fn test_garbage_payload() {
    assert_eq!(parse_qr_payload(""), None);
    assert_eq!(parse_qr_payload("plantlot:"), None);
    assert_eq!(parse_qr_payload("https://farm.example/about"), None);
    assert_eq!(parse_qr_payload("not a lot"), None);
}

#[test]
fn test_label_url() {
    assert_eq!(lot_qr_url(BASE, "LOT-1"), "https://farm.example/lots/LOT-1");
    assert_eq!(lot_qr_url("https://farm.example/", "LOT-1"), "https://farm.example/lots/LOT-1");
}

#[test]
fn test_image_url_joining() {
    assert_eq!(
        absolutize_image_url(BASE, "uploads/leaf.jpg"),
        "https://farm.example/uploads/leaf.jpg"
    );
    assert_eq!(
        absolutize_image_url("https://farm.example/", "/uploads/leaf.jpg"),
        "https://farm.example/uploads/leaf.jpg"
    );
    assert_eq!(
        absolutize_image_url(BASE, "HTTPS://cdn.example/leaf.jpg"),
        "HTTPS://cdn.example/leaf.jpg"
    );
}

#[test]
fn test_absolutize_all_reports_changes() {
    let absolute = vec!["https://cdn.example/a.jpg".to_string()];
    assert_eq!(absolutize_all(BASE, &absolute), None);

    let mixed = vec!["https://cdn.example/a.jpg".to_string(), "b.jpg".to_string()];
    assert_eq!(
        absolutize_all(BASE, &mixed),
        Some(vec![
            "https://cdn.example/a.jpg".to_string(),
            "https://farm.example/b.jpg".to_string(),
        ])
    );
}

proptest! {
    #[test]
    fn prop_label_url_round_trips(lot in "[A-Z0-9_-]{1,50}") {
        let url = lot_qr_url(BASE, &lot);
        prop_assert_eq!(parse_qr_payload(&url), Some(lot));
    }

    #[test]
    fn prop_absolutizing_is_idempotent(path in "[a-z0-9/]{1,40}") {
        let once = absolutize_image_url(BASE, &path);
        prop_assert!(!is_relative(&once));
        prop_assert_eq!(absolutize_image_url(BASE, &once), once.clone());
        prop_assert_eq!(absolutize_all(BASE, &[once]), None);
    }
}
