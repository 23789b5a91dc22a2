//! Per-school environment CSV loading.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, Trim};

use super::{columns, Loaded};
use crate::{
    error::{DataError, DatasetIssue, Result},
    manifest::Manifest,
    models::{parse_number, parse_timestamp, EnvironmentSample},
    normalize::normalize_name,
};

// ---

/// Load one environment series per manifest school from `dir`.
///
/// Every `.csv` entry (extension compared case-insensitively) whose NFC stem
/// ends with the manifest suffix is a candidate; the stripped stem names the
/// school. Stems naming a school outside the manifest are reported as
/// [`DatasetIssue::UnknownSchool`], manifest schools with no candidate as
/// [`DatasetIssue::FileNotFound`].
pub fn load_environment(dir: &Path, manifest: &Manifest) -> Result<Loaded<EnvironmentSample>> {
    // ---
    let mut loaded = Loaded::default();
    let (sources, issues) = environment_sources(dir, manifest)?;
    loaded.issues.extend(issues);

    for school in &manifest.schools {
        let Some(source) = sources.get(&school.name) else {
            let file_name = manifest.env_file_name(&school.name);
            tracing::warn!("Environment file for '{}' not found ({})", school.name, file_name);
            loaded.issues.push(DatasetIssue::FileNotFound { dataset: file_name });
            continue;
        };

        match read_environment_csv(&source.path, &school.name, &source.name) {
            Ok(samples) => {
                tracing::debug!("Loaded {} environment rows for '{}'", samples.len(), school.name);
                loaded.data.insert(school.name.clone(), samples);
            }
            Err(issue) => {
                tracing::warn!("{}", issue);
                loaded.issues.push(issue);
            }
        }
    }

    tracing::info!(
        "Environment load: {} schools, {} rows, {} issues",
        loaded.data.len(),
        loaded.row_count(),
        loaded.issues.len()
    );
    Ok(loaded)
}

/// A candidate environment file on disk.
struct Source {
    path: PathBuf,
    /// NFC file name, used in issue reports.
    name: String,
}

/// Scan `dir` once and key every environment CSV by its school.
///
/// When two entries resolve to the same school the first one the directory
/// iterator yields wins and the later one is reported as a duplicate.
fn environment_sources(
    dir: &Path,
    manifest: &Manifest,
) -> Result<(BTreeMap<String, Source>, Vec<DatasetIssue>)> {
    // ---
    let entries = fs::read_dir(dir).map_err(|source| DataError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut sources: BTreeMap<String, Source> = BTreeMap::new();
    let mut issues = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            tracing::debug!("Skipping non UTF-8 entry {:?}", entry.file_name());
            continue;
        };
        let stem = normalize_name(stem);
        let Some(school) = stem.strip_suffix(manifest.env_suffix.as_str()) else {
            continue;
        };

        let name = normalize_name(&entry.file_name().to_string_lossy());
        if !manifest.contains(school) {
            issues.push(DatasetIssue::UnknownSchool {
                source_name: name,
                school: school.to_string(),
            });
            continue;
        }
        if let Some(first) = sources.get(school) {
            tracing::warn!(
                "'{}' duplicates '{}' for school '{}', ignoring",
                name,
                first.name,
                school
            );
            issues.push(DatasetIssue::Duplicate {
                source_name: name,
                school: school.to_string(),
            });
            continue;
        }
        sources.insert(school.to_string(), Source { path, name });
    }

    Ok((sources, issues))
}

/// Read every row of one environment CSV. Any bad row rejects the file.
fn read_environment_csv(
    path: &Path,
    school: &str,
    source_name: &str,
) -> std::result::Result<Vec<EnvironmentSample>, DatasetIssue> {
    // ---
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| DatasetIssue::unreadable(source_name, e))?;

    let headers = reader
        .headers()
        .map_err(|e| DatasetIssue::unreadable(source_name, e))?
        .clone();

    let [time, temperature, humidity, ph, ec] = columns::resolve(
        headers.iter(),
        [
            columns::TIME,
            columns::TEMPERATURE,
            columns::HUMIDITY,
            columns::PH,
            columns::EC,
        ],
    )
    .map_err(|col| {
        DatasetIssue::schema(source_name, format!("missing required column '{}'", col))
    })?;

    let mut samples = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DatasetIssue::unreadable(source_name, e))?;
        // Header is line 1
        let line = i + 2;

        if record.iter().all(str::is_empty) {
            continue;
        }

        let raw_time = record.get(time).unwrap_or_default();
        let timestamp = parse_timestamp(raw_time).ok_or_else(|| {
            DatasetIssue::schema(
                source_name,
                format!("line {}: unparseable timestamp '{}'", line, raw_time),
            )
        })?;

        let number = |idx: usize, name: &str| -> std::result::Result<f64, DatasetIssue> {
            cell_number(&record, idx).ok_or_else(|| {
                DatasetIssue::schema(
                    source_name,
                    format!(
                        "line {}: column '{}' is not a number ('{}')",
                        line,
                        name,
                        record.get(idx).unwrap_or_default()
                    ),
                )
            })
        };

        samples.push(EnvironmentSample {
            school: school.to_string(),
            timestamp,
            temperature: number(temperature, columns::TEMPERATURE.name)?,
            humidity: number(humidity, columns::HUMIDITY.name)?,
            ph: number(ph, columns::PH.name)?,
            ec: number(ec, columns::EC.name)?,
        });
    }

    if samples.is_empty() {
        return Err(DatasetIssue::schema(source_name, "no data rows"));
    }
    Ok(samples)
}

fn cell_number(record: &StringRecord, idx: usize) -> Option<f64> {
    record.get(idx).and_then(parse_number)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    const HEADER: &str = "time,temperature,humidity,ph,ec\n";

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_loads_known_schools_and_reports_missing() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "송도고_환경데이터.csv",
            &format!("{HEADER}2025-05-01 09:00,20.0,60.0,6.1,1.1\n2025-05-01 10:00,22.0,62.0,6.3,0.9\n"),
        );

        let loaded = load_environment(dir.path(), &Manifest::default()).unwrap();

        assert_eq!(loaded.data.len(), 1);
        let rows = &loaded.data["송도고"];
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].school, "송도고");
        assert_eq!(rows[1].temperature, 22.0);

        // three other manifest schools have no file
        let missing = loaded
            .issues
            .iter()
            .filter(|i| matches!(i, DatasetIssue::FileNotFound { .. }))
            .count();
        assert_eq!(missing, 3);
    }

    #[test]
    fn test_missing_column_is_schema_issue_for_that_file_only() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "송도고_환경데이터.csv", "time,temperature,humidity,ec\n2025-05-01 09:00,20,60,1\n");
        write(dir.path(), "하늘고_환경데이터.csv", &format!("{HEADER}2025-05-01 09:00,20,60,6,2\n"));

        let loaded = load_environment(dir.path(), &Manifest::default()).unwrap();

        assert!(loaded.data.contains_key("하늘고"));
        assert!(!loaded.data.contains_key("송도고"));
        assert!(loaded.issues.iter().any(|i| matches!(
            i,
            DatasetIssue::Schema { source_name, detail }
                if source_name == "송도고_환경데이터.csv" && detail.contains("'ph'")
        )));
    }

    #[test]
    fn test_bad_timestamp_rejects_file() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "아라고_환경데이터.csv", &format!("{HEADER}2025-05-01 09:00,20,60,6,4\nnot-a-time,20,60,6,4\n"));

        let loaded = load_environment(dir.path(), &Manifest::default()).unwrap();

        assert!(loaded.data.is_empty());
        assert!(loaded.issues.iter().any(|i| matches!(
            i,
            DatasetIssue::Schema { detail, .. } if detail.contains("line 3")
        )));
    }

    #[test]
    fn test_non_numeric_cell_is_schema_issue() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "아라고_환경데이터.csv", &format!("{HEADER}2025-05-01 09:00,20,wet,6,4\n"));

        let loaded = load_environment(dir.path(), &Manifest::default()).unwrap();

        assert!(loaded.issues.iter().any(|i| matches!(
            i,
            DatasetIssue::Schema { detail, .. } if detail.contains("'humidity'")
        )));
    }

    #[test]
    fn test_header_only_file_is_reported() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "동산고_환경데이터.csv", HEADER);

        let loaded = load_environment(dir.path(), &Manifest::default()).unwrap();

        assert!(loaded.data.is_empty());
        assert!(loaded.issues.iter().any(|i| matches!(
            i,
            DatasetIssue::Schema { detail, .. } if detail == "no data rows"
        )));
    }

    #[test]
    fn test_unknown_school_file_is_reported() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "바다고_환경데이터.csv", &format!("{HEADER}2025-05-01 09:00,20,60,6,4\n"));
        write(dir.path(), "notes.csv", "a,b\n1,2\n");

        let loaded = load_environment(dir.path(), &Manifest::default()).unwrap();

        let unknown: Vec<_> = loaded
            .issues
            .iter()
            .filter_map(|i| match i {
                DatasetIssue::UnknownSchool { school, .. } => Some(school.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(unknown, vec!["바다고"]);
    }

    #[test]
    fn test_uppercase_extension_is_loaded() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "송도고_환경데이터.CSV", &format!("{HEADER}2025-05-01 09:00,20,60,6,1\n"));

        let loaded = load_environment(dir.path(), &Manifest::default()).unwrap();

        assert_eq!(loaded.data["송도고"].len(), 1);
        assert!(!loaded.issues.iter().any(|i| matches!(
            i,
            DatasetIssue::FileNotFound { dataset } if dataset.starts_with("송도고")
        )));
    }

    #[test]
    fn test_decomposed_duplicate_keeps_one_series() {
        // ---
        use unicode_normalization::UnicodeNormalization;

        let dir = tempfile::tempdir().unwrap();
        let composed = "하늘고_환경데이터.csv";
        let decomposed: String = composed.nfd().collect();
        write(dir.path(), composed, &format!("{HEADER}2025-05-01 09:00,20,60,6,2\n"));
        write(dir.path(), &decomposed, &format!("{HEADER}2025-05-02 09:00,21,61,6,2\n"));

        let loaded = load_environment(dir.path(), &Manifest::default()).unwrap();

        assert_eq!(loaded.data["하늘고"].len(), 1);
        let duplicates = loaded
            .issues
            .iter()
            .filter(|i| matches!(i, DatasetIssue::Duplicate { school, .. } if school == "하늘고"))
            .count();
        assert_eq!(duplicates, 1);
    }

    #[test]
    fn test_missing_directory_is_error() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let result = load_environment(&dir.path().join("absent"), &Manifest::default());
        assert!(matches!(result, Err(DataError::Directory { .. })));
    }
}
