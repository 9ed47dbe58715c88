//! Flood risk from FEMA-style flood zone designations.
//!
//! Zone text arrives in many shapes ("AE", "X (shaded)", "0.2 PCT ANNUAL
//! CHANCE", "Floodway"), so matching is done on normalized tokens and
//! prefixes rather than exact codes.

use property_core::FloodRisk;

/// Labels assessor exports put in front of the code ("ZONE AE", "FLD ZONE X").
const LABEL_TOKENS: &[&str] = &["ZONE", "FLD", "FLOOD", "FEMA"];

/// Map a flood zone designation to a risk bucket. Unrecognized text is
/// `Unknown`, never a guess.
pub fn flood_risk_from_zone(zone: &str) -> FloodRisk {
    let zone = zone.trim().to_ascii_uppercase();
    if zone.is_empty() {
        return FloodRisk::Unknown;
    }
    let code = zone
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '.' && c != '%')
        .filter(|t| !t.is_empty())
        .find(|t| !LABEL_TOKENS.contains(t))
        .unwrap_or("");

    // Coastal high hazard and regulatory floodways
    if zone.contains("FLOODWAY") || zone.contains("HIGH") || is_v_zone(code) {
        return FloodRisk::High;
    }

    // 1% annual chance (A zones) and 0.2% annual chance (shaded X, B)
    if is_a_zone(code)
        || zone.contains("0.2")
        || zone.contains("500")
        || zone.contains("SHADED")
        || zone.contains("MODERATE")
        || zone.contains("MEDIUM")
        || code == "B"
    {
        return FloodRisk::Medium;
    }

    if code == "X" || code == "C" || zone.contains("MINIMAL") || zone.contains("LOW") {
        return FloodRisk::Low;
    }

    FloodRisk::Unknown
}

fn is_v_zone(code: &str) -> bool {
    code.strip_prefix('V')
        .is_some_and(|rest| rest.is_empty() || rest == "E" || rest.chars().all(|c| c.is_ascii_digit()))
}

fn is_a_zone(code: &str) -> bool {
    code.strip_prefix('A').is_some_and(|rest| {
        matches!(rest, "" | "E" | "H" | "O" | "R" | "99") || rest.chars().all(|c| c.is_ascii_digit())
    })
}
