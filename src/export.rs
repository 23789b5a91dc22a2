//! Full-table downloads: environment as CSV, growth as an xlsx workbook.

use std::collections::BTreeMap;

use rust_xlsxwriter::{Format, Workbook};

use crate::{
    error::{DataError, Result},
    models::{EnvironmentSample, GrowthRecord},
};

// ---

pub const ENVIRONMENT_CSV_NAME: &str = "환경데이터_전체.csv";
pub const GROWTH_XLSX_NAME: &str = "생육결과_전체.xlsx";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Every environment sample, all schools, as CSV with a header row.
pub fn environment_csv(env: &BTreeMap<String, Vec<EnvironmentSample>>) -> Result<Vec<u8>> {
    // ---
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["school", "time", "temperature", "humidity", "ph", "ec"])?;

    for sample in env.values().flatten() {
        writer.write_record([
            sample.school.clone(),
            sample.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            sample.temperature.to_string(),
            sample.humidity.to_string(),
            sample.ph.to_string(),
            sample.ec.to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| DataError::Export(e.to_string()))
}

/// Every growth record, all schools, as a single-sheet workbook.
pub fn growth_xlsx(growth: &BTreeMap<String, Vec<GrowthRecord>>) -> Result<Vec<u8>> {
    // ---
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("growth")?;

    let header = ["school", "ec", "biomass_g", "leaf_count", "shoot_length_mm"];
    for (col, title) in header.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    for (i, record) in growth.values().flatten().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, record.school.as_str())?;
        if let Some(ec) = record.ec_level {
            sheet.write_number(row, 1, ec)?;
        }
        sheet.write_number(row, 2, record.biomass_g)?;
        sheet.write_number(row, 3, record.leaf_count)?;
        sheet.write_number(row, 4, record.shoot_length_mm)?;
    }

    Ok(workbook.save_to_buffer()?)
}
