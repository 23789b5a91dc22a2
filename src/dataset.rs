//! Load pipeline: loader → overlap check → treatment mapper → stamping.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    aggregate::{
        self, BiomassDistribution, EcGroupSummary, GrowthCorrelation, GrowthSchoolSummary,
        Overview, SchoolSummary,
    },
    error::{DataError, DatasetIssue, Result},
    loader::{load_environment, load_growth},
    manifest::Manifest,
    models::{EnvironmentSample, GrowthRecord},
    treatment::{resolve_treatments, stamp_ec_levels, EcSource, Treatments},
};

// ---

/// One consistent snapshot of the data directory.
///
/// `environment` and `growth` keep every school that loaded; growth records
/// carry a level wherever their school resolved one. `joined_growth` holds
/// only schools present on both sides, every record stamped, and feeds the
/// EC grouping.
#[derive(Debug, Clone)]
pub struct Dataset {
    // ---
    pub load_id: Uuid,
    pub loaded_at: DateTime<Utc>,
    pub data_dir: PathBuf,
    pub manifest: Manifest,
    pub environment: BTreeMap<String, Vec<EnvironmentSample>>,
    pub growth: BTreeMap<String, Vec<GrowthRecord>>,
    pub joined_growth: BTreeMap<String, Vec<GrowthRecord>>,
    pub treatments: Treatments,
    pub issues: Vec<DatasetIssue>,
}

/// Growth view payload.
#[derive(Debug, Clone, Serialize)]
pub struct GrowthView {
    pub by_ec: Vec<EcGroupSummary>,
    pub by_school: Vec<GrowthSchoolSummary>,
    pub correlations: Vec<GrowthCorrelation>,
    pub distributions: Vec<BiomassDistribution>,
    pub optimal_ec: f64,
}

impl Dataset {
    // ---
    /// Load and join both dataset categories from `dir`.
    ///
    /// Fails with [`DataError::EmptyResult`] when either category is empty or
    /// the two share no school. Schools on only one side are reported as
    /// [`DatasetIssue::NotInOverlap`] and left out of EC grouping, but stay
    /// in the per-school growth views and exports.
    pub fn load(dir: &Path, manifest: &Manifest, source: EcSource) -> Result<Dataset> {
        // ---
        tracing::info!("Loading datasets from {} (EC source: {})", dir.display(), source);

        let env = load_environment(dir, manifest)?;
        let growth = load_growth(dir, manifest)?;

        let mut issues = env.issues;
        issues.extend(growth.issues);

        if env.data.is_empty() {
            return Err(empty("no environment data files could be loaded", &issues));
        }
        if growth.data.is_empty() {
            return Err(empty("no growth sheets could be loaded", &issues));
        }

        let env_schools: BTreeSet<&String> = env.data.keys().collect();
        let growth_schools: BTreeSet<&String> = growth.data.keys().collect();
        let overlap: BTreeSet<String> = env_schools
            .intersection(&growth_schools)
            .map(|s| s.to_string())
            .collect();

        if overlap.is_empty() {
            return Err(empty(
                "environment and growth data share no school",
                &issues,
            ));
        }

        for school in env_schools.difference(&growth_schools) {
            issues.push(DatasetIssue::NotInOverlap {
                school: school.to_string(),
                present: "environment",
                missing: "growth",
            });
        }
        for school in growth_schools.difference(&env_schools) {
            issues.push(DatasetIssue::NotInOverlap {
                school: school.to_string(),
                present: "growth",
                missing: "environment",
            });
        }

        let environment = env.data;
        let mut growth = growth.data;
        let mut joined_growth: BTreeMap<String, Vec<GrowthRecord>> = growth
            .iter()
            .filter(|(school, _)| overlap.contains(*school))
            .map(|(school, records)| (school.clone(), records.clone()))
            .collect();

        let treatments = resolve_treatments(&environment, manifest, source)?;
        stamp_ec_levels(&mut joined_growth, &treatments)?;

        // Schools outside the overlap may have no level under the measured source
        for (school, records) in growth.iter_mut() {
            let level = treatments.level(school);
            for record in records.iter_mut() {
                record.ec_level = level;
            }
        }

        let dataset = Dataset {
            load_id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            data_dir: dir.to_path_buf(),
            manifest: manifest.clone(),
            environment,
            growth,
            joined_growth,
            treatments,
            issues,
        };

        tracing::info!(
            "Dataset {} ready: {} environment schools, {} growth schools ({} joined), {} issues",
            dataset.load_id,
            dataset.environment.len(),
            dataset.growth.len(),
            dataset.joined_growth.len(),
            dataset.issues.len()
        );
        Ok(dataset)
    }

    pub fn summaries(&self) -> Vec<SchoolSummary> {
        aggregate::summarize(&self.environment, &self.growth, &self.treatments)
    }

    pub fn overview(&self) -> Result<Overview> {
        aggregate::overview(
            &self.manifest,
            &self.environment,
            &self.growth,
            &self.joined_growth,
            &self.treatments,
        )
    }

    pub fn best_ec_level(&self) -> Result<f64> {
        aggregate::best_ec_level(&self.joined_growth, &self.treatments)
    }

    pub fn growth_view(&self) -> Result<GrowthView> {
        // ---
        let by_ec = aggregate::growth_by_ec(&self.joined_growth, &self.treatments)?;
        let optimal_ec = aggregate::best_group(&by_ec)
            .map(|g| g.ec)
            .ok_or_else(|| DataError::AggregationUndefined("no growth groups".to_string()))?;

        Ok(GrowthView {
            by_school: aggregate::growth_by_school(&self.growth, &self.treatments),
            correlations: aggregate::growth_correlations(&self.growth),
            distributions: aggregate::biomass_distributions(&self.growth),
            by_ec,
            optimal_ec,
        })
    }

    /// Environment series of one school, looked up in either Unicode form.
    pub fn series(&self, school: &str) -> Option<&[EnvironmentSample]> {
        let school = crate::normalize::normalize_name(school.trim());
        self.environment.get(&school).map(Vec::as_slice)
    }
}

fn empty(reason: &str, issues: &[DatasetIssue]) -> DataError {
    // ---
    tracing::error!("{} ({} dataset issues)", reason, issues.len());
    if issues.is_empty() {
        return DataError::EmptyResult(reason.to_string());
    }
    let detail: Vec<String> = issues.iter().map(ToString::to_string).collect();
    DataError::EmptyResult(format!("{}; {}", reason, detail.join("; ")))
}
