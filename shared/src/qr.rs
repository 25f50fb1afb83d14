//! QR code payloads printed on plant lot labels
//!
//! The frontend decodes the label image; this module only interprets the
//! decoded text.

use crate::validation::validate_lot_number;

const PAYLOAD_PREFIX: &str = "plantlot:";
const LOTS_SEGMENT: &str = "/lots/";

/// Extract a lot number from a decoded QR payload.
///
/// Accepts `LOT-2024-001`, `plantlot:LOT-2024-001` (prefix is
/// case-insensitive) and URLs such as `https://farm.example/lots/LOT-2024-001`.
/// Returns `None` when nothing that looks like a lot number remains.
pub fn parse_qr_payload(payload: &str) -> Option<String> {
    let payload = payload.trim();

    let candidate = if let Some(rest) = strip_prefix_ignore_case(payload, PAYLOAD_PREFIX) {
        rest.trim()
    } else if let Some(pos) = payload.find(LOTS_SEGMENT) {
        let rest = &payload[pos + LOTS_SEGMENT.len()..];
        let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        &rest[..end]
    } else {
        payload
    };

    if validate_lot_number(candidate).is_err() {
        return None;
    }
    Some(candidate.to_string())
}

/// URL encoded into a lot's label
pub fn lot_qr_url(base_url: &str, lot_number: &str) -> String {
    format!("{}{}{}", base_url.trim_end_matches('/'), LOTS_SEGMENT, lot_number)
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        value.get(prefix.len()..)
    } else {
        None
    }
}
