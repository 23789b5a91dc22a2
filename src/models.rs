//! Data models for the EC treatment pipeline.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

// ---

/// One environmental sensor reading from a school's series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentSample {
    // ---
    pub school: String,
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    /// Instantaneous measured EC.
    pub ec: f64,
}

/// One plant's growth measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthRecord {
    // ---
    pub school: String,
    pub biomass_g: f64,
    pub leaf_count: f64,
    pub shoot_length_mm: f64,
    /// Treatment level of `school`, stamped by the treatment mapper.
    pub ec_level: Option<f64>,
}

impl GrowthRecord {
    // ---
    pub fn new(school: &str, biomass_g: f64, leaf_count: f64, shoot_length_mm: f64) -> Self {
        GrowthRecord {
            school: school.to_string(),
            biomass_g,
            leaf_count,
            shoot_length_mm,
            ec_level: None,
        }
    }
}

/// Formats seen in the exported sensor CSVs, tried in order after RFC 3339.
const TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Parse a timestamp cell into a naive local time.
///
/// RFC 3339 values keep their wall-clock time and drop the offset, matching
/// how the other formats (which carry no offset) are interpreted.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    // ---
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for fmt in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    // Bare dates count as midnight
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a numeric cell, tolerating surrounding whitespace and thousands
/// separators. Non-finite results are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    // ---
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
