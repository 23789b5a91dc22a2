//! Grouped descriptive statistics over loaded datasets.
//!
//! Every function here is a pure snapshot of its inputs. Statistics over an
//! empty group are `None` (serialized as `null`); single-value results with
//! no defined answer return [`DataError::AggregationUndefined`].

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
};

use serde::Serialize;

use crate::{
    error::{DataError, Result},
    manifest::Manifest,
    models::{EnvironmentSample, GrowthRecord},
    treatment::Treatments,
};

// ---

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Largest value, `None` for an empty slice.
pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Pearson correlation coefficient of paired samples.
///
/// `None` when the slices differ in length, hold fewer than two pairs, or
/// either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    // ---
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

/// Five-number summary, as drawn by a box plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Min, quartiles and max of `values`, `None` for an empty slice.
///
/// Quartiles interpolate linearly between closest ranks.
pub fn distribution(values: &[f64]) -> Option<Distribution> {
    // ---
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let quantile = |p: f64| -> Option<f64> {
        let pos = p * (sorted.len().checked_sub(1)? as f64);
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let (a, b) = (*sorted.get(lo)?, *sorted.get(hi)?);
        Some(a + (b - a) * (pos - lo as f64))
    };

    Some(Distribution {
        min: *sorted.first()?,
        q1: quantile(0.25)?,
        median: quantile(0.5)?,
        q3: quantile(0.75)?,
        max: *sorted.last()?,
    })
}

/// Per-school environment and growth summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolSummary {
    // ---
    pub school: String,
    pub mean_temperature: Option<f64>,
    pub mean_humidity: Option<f64>,
    pub mean_ph: Option<f64>,
    /// Mean of the measured EC samples.
    pub mean_measured_ec: Option<f64>,
    /// Manifest design target.
    pub target_ec: Option<f64>,
    /// Level the school's growth records are stamped with.
    pub treatment_ec: Option<f64>,
    pub sample_count: usize,
    pub record_count: usize,
}

/// Growth statistics for one EC treatment level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcGroupSummary {
    // ---
    pub ec: f64,
    pub schools: Vec<String>,
    pub record_count: usize,
    pub mean_biomass_g: f64,
    pub mean_leaf_count: f64,
    pub mean_shoot_length_mm: f64,
    pub max_biomass_g: f64,
}

/// Growth statistics for one school.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthSchoolSummary {
    // ---
    pub school: String,
    pub ec_level: Option<f64>,
    pub record_count: usize,
    pub mean_biomass_g: Option<f64>,
    pub mean_leaf_count: Option<f64>,
    pub mean_shoot_length_mm: Option<f64>,
    pub max_biomass_g: Option<f64>,
}

/// How leaf count and shoot length track biomass within one school.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthCorrelation {
    pub school: String,
    pub record_count: usize,
    pub leaf_count_vs_biomass: Option<f64>,
    pub shoot_length_vs_biomass: Option<f64>,
}

/// Biomass spread of one school.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiomassDistribution {
    pub school: String,
    pub biomass_g: Option<Distribution>,
}

/// One row of the overview table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewRow {
    pub school: String,
    pub target_ec: f64,
    pub treatment_ec: Option<f64>,
    pub record_count: usize,
}

/// Headline figures for the experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    // ---
    pub schools: Vec<OverviewRow>,
    pub total_records: usize,
    pub mean_temperature: Option<f64>,
    pub mean_humidity: Option<f64>,
    /// EC level with the highest mean biomass, if any growth data exists.
    pub optimal_ec: Option<f64>,
}

/// Per-school summary across both collections.
///
/// One entry for every school present in `env` or `growth`, ordered by
/// target EC (schools without a target last) and then by name.
pub fn summarize(
    env: &BTreeMap<String, Vec<EnvironmentSample>>,
    growth: &BTreeMap<String, Vec<GrowthRecord>>,
    treatments: &Treatments,
) -> Vec<SchoolSummary> {
    // ---
    let schools: BTreeSet<&String> = env.keys().chain(growth.keys()).collect();

    let mut summaries: Vec<SchoolSummary> = schools
        .into_iter()
        .map(|school| {
            let samples = env.get(school).map(Vec::as_slice).unwrap_or_default();
            let column = |f: fn(&EnvironmentSample) -> f64| -> Vec<f64> {
                samples.iter().map(f).collect()
            };

            SchoolSummary {
                school: school.clone(),
                mean_temperature: mean(&column(|s| s.temperature)),
                mean_humidity: mean(&column(|s| s.humidity)),
                mean_ph: mean(&column(|s| s.ph)),
                mean_measured_ec: mean(&column(|s| s.ec)),
                target_ec: treatments.target(school),
                treatment_ec: treatments.level(school),
                sample_count: samples.len(),
                record_count: growth.get(school).map_or(0, Vec::len),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        cmp_optional(a.target_ec, b.target_ec).then_with(|| a.school.cmp(&b.school))
    });
    summaries
}

/// Growth statistics grouped by EC level, in ascending EC order.
///
/// Each school's level comes from `treatments`. A school with records but
/// no level is a [`DataError::Mapping`].
pub fn growth_by_ec(
    growth: &BTreeMap<String, Vec<GrowthRecord>>,
    treatments: &Treatments,
) -> Result<Vec<EcGroupSummary>> {
    // ---
    let mut groups: Vec<(f64, Vec<String>, Vec<&GrowthRecord>)> = Vec::new();

    for (school, records) in growth {
        if records.is_empty() {
            continue;
        }
        let level = treatments
            .level(school)
            .ok_or_else(|| DataError::Mapping(format!("no EC level for school '{}'", school)))?;

        match groups.iter_mut().find(|(ec, _, _)| ec.to_bits() == level.to_bits()) {
            Some((_, schools, rows)) => {
                schools.push(school.clone());
                rows.extend(records.iter());
            }
            None => groups.push((level, vec![school.clone()], records.iter().collect())),
        }
    }

    groups.sort_by(|a, b| a.0.total_cmp(&b.0));

    groups
        .into_iter()
        .map(|(ec, schools, rows)| {
            let biomass: Vec<f64> = rows.iter().map(|r| r.biomass_g).collect();
            let leaves: Vec<f64> = rows.iter().map(|r| r.leaf_count).collect();
            let shoots: Vec<f64> = rows.iter().map(|r| r.shoot_length_mm).collect();

            let (Some(mean_biomass_g), Some(mean_leaf_count), Some(mean_shoot_length_mm)) =
                (mean(&biomass), mean(&leaves), mean(&shoots))
            else {
                return Err(DataError::AggregationUndefined(format!(
                    "EC group {} has no records",
                    ec
                )));
            };
            let Some(max_biomass_g) = max(&biomass) else {
                return Err(DataError::AggregationUndefined(format!(
                    "EC group {} has no records",
                    ec
                )));
            };

            Ok(EcGroupSummary {
                ec,
                schools,
                record_count: rows.len(),
                mean_biomass_g,
                mean_leaf_count,
                mean_shoot_length_mm,
                max_biomass_g,
            })
        })
        .collect()
}

/// Growth statistics per school, ordered by treatment level then name.
pub fn growth_by_school(
    growth: &BTreeMap<String, Vec<GrowthRecord>>,
    treatments: &Treatments,
) -> Vec<GrowthSchoolSummary> {
    // ---
    let mut out: Vec<GrowthSchoolSummary> = growth
        .iter()
        .map(|(school, records)| {
            let biomass: Vec<f64> = records.iter().map(|r| r.biomass_g).collect();
            let leaves: Vec<f64> = records.iter().map(|r| r.leaf_count).collect();
            let shoots: Vec<f64> = records.iter().map(|r| r.shoot_length_mm).collect();

            GrowthSchoolSummary {
                school: school.clone(),
                ec_level: treatments.level(school),
                record_count: records.len(),
                mean_biomass_g: mean(&biomass),
                mean_leaf_count: mean(&leaves),
                mean_shoot_length_mm: mean(&shoots),
                max_biomass_g: max(&biomass),
            }
        })
        .collect();

    out.sort_by(|a, b| cmp_optional(a.ec_level, b.ec_level).then_with(|| a.school.cmp(&b.school)));
    out
}

/// Per-school Pearson correlations against biomass, in school name order.
pub fn growth_correlations(
    growth: &BTreeMap<String, Vec<GrowthRecord>>,
) -> Vec<GrowthCorrelation> {
    // ---
    growth
        .iter()
        .map(|(school, records)| {
            let biomass: Vec<f64> = records.iter().map(|r| r.biomass_g).collect();
            let leaves: Vec<f64> = records.iter().map(|r| r.leaf_count).collect();
            let shoots: Vec<f64> = records.iter().map(|r| r.shoot_length_mm).collect();

            GrowthCorrelation {
                school: school.clone(),
                record_count: records.len(),
                leaf_count_vs_biomass: pearson(&leaves, &biomass),
                shoot_length_vs_biomass: pearson(&shoots, &biomass),
            }
        })
        .collect()
}

/// Per-school biomass five-number summaries, in school name order.
pub fn biomass_distributions(
    growth: &BTreeMap<String, Vec<GrowthRecord>>,
) -> Vec<BiomassDistribution> {
    // ---
    growth
        .iter()
        .map(|(school, records)| {
            let biomass: Vec<f64> = records.iter().map(|r| r.biomass_g).collect();
            BiomassDistribution {
                school: school.clone(),
                biomass_g: distribution(&biomass),
            }
        })
        .collect()
}

/// The group with maximal mean biomass.
///
/// Ties go to the first group in iteration order, which for
/// [`growth_by_ec`] output is the lowest EC level.
pub fn best_group(groups: &[EcGroupSummary]) -> Option<&EcGroupSummary> {
    // ---
    groups.iter().fold(None, |best, g| match best {
        Some(b) if b.mean_biomass_g >= g.mean_biomass_g => Some(b),
        _ => Some(g),
    })
}

/// EC level whose mean biomass is maximal.
///
/// Returns [`DataError::AggregationUndefined`] when there are no growth
/// records to group.
pub fn best_ec_level(
    growth: &BTreeMap<String, Vec<GrowthRecord>>,
    treatments: &Treatments,
) -> Result<f64> {
    // ---
    let groups = growth_by_ec(growth, treatments)?;
    best_group(&groups).map(|g| g.ec).ok_or_else(|| {
        DataError::AggregationUndefined("best EC level over zero growth groups".to_string())
    })
}

/// Headline figures: per-school table in manifest order, totals, overall
/// environment means and the optimal EC level.
///
/// Record counts come from `growth`, every loaded sheet. The optimal EC
/// level is computed over `joined`, the schools that also have
/// environment data.
pub fn overview(
    manifest: &Manifest,
    env: &BTreeMap<String, Vec<EnvironmentSample>>,
    growth: &BTreeMap<String, Vec<GrowthRecord>>,
    joined: &BTreeMap<String, Vec<GrowthRecord>>,
    treatments: &Treatments,
) -> Result<Overview> {
    // ---
    let schools = manifest
        .schools
        .iter()
        .map(|s| OverviewRow {
            school: s.name.clone(),
            target_ec: s.target_ec,
            treatment_ec: treatments.level(&s.name),
            record_count: growth.get(&s.name).map_or(0, Vec::len),
        })
        .collect();

    let temperatures: Vec<f64> = env.values().flatten().map(|s| s.temperature).collect();
    let humidities: Vec<f64> = env.values().flatten().map(|s| s.humidity).collect();

    let optimal_ec = match best_ec_level(joined, treatments) {
        Ok(ec) => Some(ec),
        Err(DataError::AggregationUndefined(reason)) => {
            tracing::debug!("No optimal EC: {}", reason);
            None
        }
        Err(e) => return Err(e),
    };

    Ok(Overview {
        schools,
        total_records: growth.values().map(Vec::len).sum(),
        mean_temperature: mean(&temperatures),
        mean_humidity: mean(&humidities),
        optimal_ec,
    })
}

/// `Some` values ascending, `None` last.
fn cmp_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
