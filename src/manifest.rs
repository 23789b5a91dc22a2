//! Experiment manifest: which schools take part, their target EC level, and
//! how their source files are named.
//!
//! Dataset identity comes from this list. Files and sheets are matched
//! against it through [`crate::normalize`]; anything not listed is reported
//! rather than guessed at.

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::normalize::normalize_name;

/// Default schools and their fixed EC targets, in presentation order.
pub const DEFAULT_SCHOOLS: [(&str, f64); 4] = [
    ("송도고", 1.0),
    ("하늘고", 2.0),
    ("아라고", 4.0),
    ("동산고", 8.0),
];

pub const DEFAULT_ENV_SUFFIX: &str = "_환경데이터";
pub const DEFAULT_GROWTH_WORKBOOK: &str = "4개교_생육결과데이터.xlsx";

/// One participating school.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolEntry {
    // ---
    /// NFC-normalized school name.
    pub name: String,
    /// Fixed design-parameter EC level for this school.
    pub target_ec: f64,
}

/// Expected datasets for one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    // ---
    pub schools: Vec<SchoolEntry>,

    /// Suffix appended to a school name to form its environment file stem.
    pub env_suffix: String,

    /// File name of the single growth workbook.
    pub growth_workbook: String,
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest::new(
            DEFAULT_SCHOOLS.iter().map(|(n, ec)| (n.to_string(), *ec)),
            DEFAULT_ENV_SUFFIX,
            DEFAULT_GROWTH_WORKBOOK,
        )
    }
}

impl Manifest {
    // ---
    pub fn new(
        schools: impl IntoIterator<Item = (String, f64)>,
        env_suffix: &str,
        growth_workbook: &str,
    ) -> Self {
        // ---
        let mut entries: Vec<SchoolEntry> = Vec::new();
        for (name, target_ec) in schools {
            let name = normalize_name(name.trim());
            if entries.iter().any(|e| e.name == name) {
                tracing::warn!("Duplicate school '{}' in manifest, keeping first", name);
                continue;
            }
            entries.push(SchoolEntry { name, target_ec });
        }

        Manifest {
            schools: entries,
            env_suffix: normalize_name(env_suffix),
            growth_workbook: normalize_name(growth_workbook),
        }
    }

    /// Look up a school by name in either Unicode form.
    pub fn school(&self, name: &str) -> Option<&SchoolEntry> {
        let name = normalize_name(name.trim());
        self.schools.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.school(name).is_some()
    }

    pub fn target_ec(&self, name: &str) -> Option<f64> {
        self.school(name).map(|s| s.target_ec)
    }

    /// Position of a school in manifest order; unknown schools sort last.
    pub fn rank(&self, name: &str) -> usize {
        let name = normalize_name(name);
        self.schools
            .iter()
            .position(|s| s.name == name)
            .unwrap_or(self.schools.len())
    }

    /// Expected environment file name for `school`.
    pub fn env_file_name(&self, school: &str) -> String {
        format!("{}{}.csv", normalize_name(school), self.env_suffix)
    }
}

/// Parse a `name=ec,name=ec` list as used by the `SCHOOL_EC_TARGETS`
/// environment variable.
pub fn parse_school_targets(raw: &str) -> Result<Vec<(String, f64)>> {
    // ---
    let mut out = Vec::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, ec) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid school target '{}', expected name=ec", pair))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow!("Empty school name in '{}'", pair));
        }
        let ec: f64 = ec
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid EC for '{}': {}", name, e))?;
        if !ec.is_finite() {
            return Err(anyhow!("EC for '{}' must be finite", name));
        }
        out.push((name.to_string(), ec));
    }

    if out.is_empty() {
        return Err(anyhow!("School target list is empty"));
    }
    Ok(out)
}
