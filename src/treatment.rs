//! Treatment mapper: school → EC level.
//!
//! Two strategies exist because the fixed design table and the measured
//! nutrient solution drift apart over an experiment. [`Treatments`] always
//! carries both the manifest target and the resolved level so downstream
//! views can show them side by side.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Serialize;

use crate::{
    aggregate::mean,
    error::{DataError, Result},
    manifest::Manifest,
    models::{EnvironmentSample, GrowthRecord},
};

// ---

/// Where a school's treatment level comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EcSource {
    /// Fixed target from the manifest.
    #[default]
    Target,
    /// Mean of the school's measured EC samples.
    Measured,
}

impl FromStr for EcSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "target" => Ok(EcSource::Target),
            "measured" => Ok(EcSource::Measured),
            other => Err(format!("unknown EC source '{}', expected target|measured", other)),
        }
    }
}

impl fmt::Display for EcSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcSource::Target => f.write_str("target"),
            EcSource::Measured => f.write_str("measured"),
        }
    }
}

/// Resolved school → EC mapping for one load cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Treatments {
    // ---
    pub source: EcSource,

    /// Level each school's growth records are stamped with.
    pub levels: BTreeMap<String, f64>,

    /// Manifest target per school, independent of `source`.
    pub targets: BTreeMap<String, f64>,
}

impl Treatments {
    // ---
    pub fn level(&self, school: &str) -> Option<f64> {
        self.levels.get(school).copied()
    }

    pub fn target(&self, school: &str) -> Option<f64> {
        self.targets.get(school).copied()
    }
}

/// Build the school → EC mapping using `source`.
///
/// With [`EcSource::Measured`] only schools present in `env` get a level, and
/// a school present with zero samples is a [`DataError::Mapping`].
pub fn resolve_treatments(
    env: &BTreeMap<String, Vec<EnvironmentSample>>,
    manifest: &Manifest,
    source: EcSource,
) -> Result<Treatments> {
    // ---
    let targets: BTreeMap<String, f64> = manifest
        .schools
        .iter()
        .map(|s| (s.name.clone(), s.target_ec))
        .collect();

    let levels = match source {
        EcSource::Target => targets.clone(),
        EcSource::Measured => {
            let mut levels = BTreeMap::new();
            for (school, samples) in env {
                let ecs: Vec<f64> = samples.iter().map(|s| s.ec).collect();
                let level = mean(&ecs).ok_or_else(|| {
                    DataError::Mapping(format!("school '{}' has no EC samples", school))
                })?;
                levels.insert(school.clone(), level);
            }
            levels
        }
    };

    tracing::debug!("Resolved {} treatment levels from {}", levels.len(), source);
    Ok(Treatments {
        source,
        levels,
        targets,
    })
}

/// Stamp every growth record with its school's resolved EC level.
///
/// Idempotent. If any school holding records has no level, nothing is
/// stamped and the offending schools are listed in the error.
pub fn stamp_ec_levels(
    growth: &mut BTreeMap<String, Vec<GrowthRecord>>,
    treatments: &Treatments,
) -> Result<()> {
    // ---
    let missing: Vec<&str> = growth
        .iter()
        .filter(|(school, records)| !records.is_empty() && treatments.level(school).is_none())
        .map(|(school, _)| school.as_str())
        .collect();

    if !missing.is_empty() {
        return Err(DataError::Mapping(format!(
            "no EC level for schools with growth records: {}",
            missing.join(", ")
        )));
    }

    for records in growth.values_mut() {
        for record in records.iter_mut() {
            record.ec_level = treatments.level(&record.school);
        }
    }
    Ok(())
}
