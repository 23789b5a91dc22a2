//! Growth workbook loading: one sheet per school.

use std::{collections::BTreeSet, path::Path};

use calamine::{open_workbook, Data, Reader, Xlsx};

use super::{columns, Loaded};
use crate::{
    error::{DataError, DatasetIssue, Result},
    manifest::Manifest,
    models::{parse_number, GrowthRecord},
    normalize::{find_file_by_normalized_name, normalize_name},
};

// ---

/// Load the growth workbook named in `manifest` from `dir`.
///
/// Records come back unstamped (`ec_level == None`); the treatment mapper
/// assigns levels in a second pass. Sheets whose name is not a manifest
/// school are reported and skipped. If two sheet names normalize to the same
/// school the first one wins.
pub fn load_growth(dir: &Path, manifest: &Manifest) -> Result<Loaded<GrowthRecord>> {
    // ---
    let mut loaded = Loaded::default();
    let workbook_name = manifest.growth_workbook.as_str();

    let path = find_file_by_normalized_name(dir, workbook_name).map_err(|source| {
        DataError::Directory {
            path: dir.to_path_buf(),
            source,
        }
    })?;

    let Some(path) = path else {
        tracing::warn!("Growth workbook '{}' not found in {}", workbook_name, dir.display());
        loaded.issues.push(DatasetIssue::FileNotFound {
            dataset: workbook_name.to_string(),
        });
        return Ok(loaded);
    };

    let mut workbook: Xlsx<_> = match open_workbook(&path) {
        Ok(wb) => wb,
        Err(e) => {
            tracing::warn!("Cannot open growth workbook {}: {}", path.display(), e);
            loaded.issues.push(DatasetIssue::unreadable(workbook_name, e));
            return Ok(loaded);
        }
    };

    let mut seen: BTreeSet<String> = BTreeSet::new();
    for sheet in workbook.sheet_names() {
        let source_name = format!("{}#{}", workbook_name, sheet);
        let school = normalize_name(sheet.trim());

        if !manifest.contains(&school) {
            loaded.issues.push(DatasetIssue::UnknownSchool { source_name, school });
            continue;
        }
        if !seen.insert(school.clone()) {
            tracing::warn!("Sheet '{}' duplicates school '{}', ignoring", sheet, school);
            loaded.issues.push(DatasetIssue::Duplicate { source_name, school });
            continue;
        }

        let range = match workbook.worksheet_range(&sheet) {
            Ok(range) => range,
            Err(e) => {
                loaded.issues.push(DatasetIssue::unreadable(source_name, e));
                continue;
            }
        };

        // Ranges start at the first used cell, not necessarily A1
        let header_row = range.start().map_or(1, |(row, _)| row as usize + 1);
        let rows: Vec<&[Data]> = range.rows().collect();
        match read_growth_rows(&rows, header_row, &school, &source_name) {
            Ok(records) => {
                tracing::debug!("Loaded {} growth rows for '{}'", records.len(), school);
                loaded.data.insert(school, records);
            }
            Err(issue) => {
                tracing::warn!("{}", issue);
                loaded.issues.push(issue);
            }
        }
    }

    tracing::info!(
        "Growth load: {} schools, {} rows, {} issues",
        loaded.data.len(),
        loaded.row_count(),
        loaded.issues.len()
    );
    Ok(loaded)
}

/// Convert one sheet's rows (header first) into records. `header_row` is
/// the 1-based spreadsheet row of the header, used in issue reports.
fn read_growth_rows(
    rows: &[&[Data]],
    header_row: usize,
    school: &str,
    source_name: &str,
) -> std::result::Result<Vec<GrowthRecord>, DatasetIssue> {
    // ---
    let Some((header, body)) = rows.split_first() else {
        return Err(DatasetIssue::schema(source_name, "sheet is empty"));
    };

    let header_text: Vec<String> = header.iter().map(|c| c.to_string()).collect();
    let [biomass, leaves, shoot] = columns::resolve(
        header_text.iter().map(String::as_str),
        [columns::BIOMASS, columns::LEAF_COUNT, columns::SHOOT_LENGTH],
    )
    .map_err(|col| {
        DatasetIssue::schema(source_name, format!("missing required column '{}'", col))
    })?;

    let mut records = Vec::new();
    for (i, row) in body.iter().enumerate() {
        let row_no = header_row + i + 1;

        if row.iter().all(is_blank) {
            continue;
        }

        let number = |idx: usize, name: &str| -> std::result::Result<f64, DatasetIssue> {
            row.get(idx).and_then(cell_number).ok_or_else(|| {
                DatasetIssue::schema(
                    source_name,
                    format!(
                        "row {}: column '{}' is not a number ('{}')",
                        row_no,
                        name,
                        row.get(idx).map(|c| c.to_string()).unwrap_or_default()
                    ),
                )
            })
        };

        records.push(GrowthRecord::new(
            school,
            number(biomass, columns::BIOMASS.name)?,
            number(leaves, columns::LEAF_COUNT.name)?,
            number(shoot, columns::SHOOT_LENGTH.name)?,
        ));
    }

    if records.is_empty() {
        return Err(DatasetIssue::schema(source_name, "no data rows"));
    }
    Ok(records)
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) if f.is_finite() => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_number(s),
        _ => None,
    }
}
