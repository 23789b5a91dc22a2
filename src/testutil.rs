//! Fixture builders shared by unit tests.

use std::path::Path;

use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;

use crate::models::{EnvironmentSample, GrowthRecord};

pub const GROWTH_HEADER: [&str; 3] = ["생중량(g)", "잎 수(장)", "지상부 길이(mm)"];

/// Write a growth workbook with one sheet per `(name, rows)` pair.
/// Each row is `[biomass, leaf count, shoot length]`.
pub fn write_workbook(path: &Path, sheets: &[(&str, Vec<[f64; 3]>)]) {
    // ---
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).unwrap();
        for (col, title) in GROWTH_HEADER.iter().enumerate() {
            sheet.write_string(0, col as u16, *title).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                sheet.write_number(r as u32 + 1, c as u16, *value).unwrap();
            }
        }
    }
    workbook.save(path).unwrap();
}

pub fn sample(school: &str, hour: u32, ec: f64) -> EnvironmentSample {
    // ---
    EnvironmentSample {
        school: school.to_string(),
        timestamp: NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap(),
        temperature: 20.0 + hour as f64,
        humidity: 60.0,
        ph: 6.0,
        ec,
    }
}

pub fn record(school: &str, biomass_g: f64) -> GrowthRecord {
    GrowthRecord::new(school, biomass_g, 6.0, 100.0)
}
