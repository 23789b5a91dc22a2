use std::collections::BTreeMap;

use anyhow::Result;
use ecflow::{
    best_ec_level, find_file_by_normalized_name, load_environment, load_growth, resolve_treatments,
    stamp_ec_levels, summarize, DataError, Dataset, DatasetIssue, EcSource, GrowthRecord, Manifest,
};

mod common;
use common::{four_school_growth, render, write_env, write_four_schools, write_growth, Form};

#[test]
fn composed_and_decomposed_targets_resolve_to_same_file() -> Result<()> {
    // ---
    let dir = tempfile::tempdir()?;
    for school in ["송도고", "하늘고"] {
        write_env(dir.path(), school, &[1.0], Form::Nfd);
    }
    write_env(dir.path(), "아라고", &[1.0], Form::Nfc);

    for school in ["송도고", "하늘고", "아라고"] {
        let name = format!("{}_환경데이터.csv", school);
        let composed = find_file_by_normalized_name(dir.path(), &render(&name, Form::Nfc))?;
        let decomposed = find_file_by_normalized_name(dir.path(), &render(&name, Form::Nfd))?;
        assert!(composed.is_some(), "{} not found", name);
        assert_eq!(composed, decomposed);
    }
    Ok(())
}

#[test]
fn row_counts_round_trip_for_every_school() -> Result<()> {
    // ---
    let dir = tempfile::tempdir()?;
    write_four_schools(dir.path());
    let manifest = Manifest::default();

    let env = load_environment(dir.path(), &manifest)?;
    let growth = load_growth(dir.path(), &manifest)?;

    assert!(env.issues.is_empty(), "{:?}", env.issues);
    assert!(growth.issues.is_empty(), "{:?}", growth.issues);
    assert_eq!(env.data.len(), 4);
    assert_eq!(growth.data.len(), 4);

    let expected_env = [("송도고", 3), ("하늘고", 2), ("아라고", 4), ("동산고", 1)];
    for (school, rows) in expected_env {
        assert_eq!(env.data[school].len(), rows, "environment rows for {}", school);
    }
    for (school, biomass) in four_school_growth() {
        assert_eq!(growth.data[school].len(), biomass.len(), "growth rows for {}", school);
    }
    Ok(())
}

#[test]
fn decomposed_workbook_and_sheet_names_load() -> Result<()> {
    // ---
    let dir = tempfile::tempdir()?;
    write_growth(dir.path(), &four_school_growth(), Form::Nfd);

    let growth = load_growth(dir.path(), &Manifest::default())?;

    assert!(growth.issues.is_empty(), "{:?}", growth.issues);
    assert_eq!(growth.data.len(), 4);
    assert!(growth.data.contains_key("하늘고"));
    Ok(())
}

#[test]
fn resolve_treatments_is_deterministic() -> Result<()> {
    // ---
    let dir = tempfile::tempdir()?;
    write_four_schools(dir.path());
    let manifest = Manifest::default();
    let env = load_environment(dir.path(), &manifest)?;

    for source in [EcSource::Target, EcSource::Measured] {
        let a = resolve_treatments(&env.data, &manifest, source)?;
        let b = resolve_treatments(&env.data, &manifest, source)?;
        assert_eq!(a.levels.len(), b.levels.len());
        for (school, level) in &a.levels {
            assert_eq!(level.to_bits(), b.levels[school].to_bits(), "{} under {}", school, source);
        }
    }
    Ok(())
}

#[test]
fn best_ec_is_two_when_it_has_highest_mean_biomass() -> Result<()> {
    // ---
    let manifest = Manifest::default();
    let treatments = resolve_treatments(&BTreeMap::new(), &manifest, EcSource::Target)?;
    let mut growth: BTreeMap<String, Vec<GrowthRecord>> = BTreeMap::new();
    for (school, biomass) in [("송도고", 5.0), ("하늘고", 9.5), ("아라고", 9.4), ("동산고", 1.0)] {
        growth.insert(
            school.to_string(),
            vec![GrowthRecord::new(school, biomass, 6.0, 100.0)],
        );
    }

    assert_eq!(best_ec_level(&growth, &treatments)?, 2.0);
    Ok(())
}

#[test]
fn empty_growth_is_aggregation_undefined() -> Result<()> {
    // ---
    let treatments = resolve_treatments(&BTreeMap::new(), &Manifest::default(), EcSource::Target)?;

    let result = best_ec_level(&BTreeMap::new(), &treatments);

    assert!(matches!(result, Err(DataError::AggregationUndefined(_))));
    Ok(())
}

#[test]
fn four_school_scenario() -> Result<()> {
    // ---
    let dir = tempfile::tempdir()?;
    write_four_schools(dir.path());
    let manifest = Manifest::default();

    let env = load_environment(dir.path(), &manifest)?;
    let mut growth = load_growth(dir.path(), &manifest)?;
    let treatments = resolve_treatments(&env.data, &manifest, EcSource::Target)?;
    stamp_ec_levels(&mut growth.data, &treatments)?;

    assert_eq!(best_ec_level(&growth.data, &treatments)?, 2.0);

    let summaries = summarize(&env.data, &growth.data, &treatments);
    assert_eq!(summaries.len(), 4);
    let expected = [("송도고", 1.0, 3), ("하늘고", 2.0, 4), ("아라고", 4.0, 2), ("동산고", 8.0, 5)];
    for (summary, (school, ec, records)) in summaries.iter().zip(expected) {
        assert_eq!(summary.school, school);
        assert_eq!(summary.target_ec, Some(ec));
        assert_eq!(summary.record_count, records);
    }
    Ok(())
}

#[test]
fn four_school_scenario_without_haneul_growth_sheet() -> Result<()> {
    // ---
    let dir = tempfile::tempdir()?;
    write_four_schools(dir.path());
    let without_haneul: Vec<_> = four_school_growth()
        .into_iter()
        .filter(|(school, _)| *school != "하늘고")
        .collect();
    write_growth(dir.path(), &without_haneul, Form::Nfc);

    let dataset = Dataset::load(dir.path(), &Manifest::default(), EcSource::Target)?;

    // environment file is kept, growth analysis drops EC 2.0
    assert!(dataset.environment.contains_key("하늘고"));
    assert!(!dataset.growth.contains_key("하늘고"));
    assert!(dataset.issues.contains(&DatasetIssue::NotInOverlap {
        school: "하늘고".to_string(),
        present: "environment",
        missing: "growth",
    }));
    assert_eq!(dataset.best_ec_level()?, 4.0);

    let view = dataset.growth_view()?;
    let levels: Vec<f64> = view.by_ec.iter().map(|g| g.ec).collect();
    assert_eq!(levels, vec![1.0, 4.0, 8.0]);
    Ok(())
}

#[test]
fn bad_file_does_not_block_the_others() -> Result<()> {
    // ---
    let dir = tempfile::tempdir()?;
    write_four_schools(dir.path());
    // Overwrite 아라고 with a file missing the pH column
    std::fs::write(
        dir.path().join("아라고_환경데이터.csv"),
        "time,temperature,humidity,ec\n2025-05-01 12:00,20,50,4\n",
    )?;

    let dataset = Dataset::load(dir.path(), &Manifest::default(), EcSource::Target)?;

    assert_eq!(dataset.environment.len(), 3);
    assert!(dataset.issues.iter().any(|i| matches!(
        i,
        DatasetIssue::Schema { source_name, .. } if source_name.starts_with("아라고")
    )));
    Ok(())
}

#[test]
fn missing_everything_is_empty_result() -> Result<()> {
    // ---
    let dir = tempfile::tempdir()?;
    write_env(dir.path(), "송도고", &[1.0], Form::Nfc);

    let result = Dataset::load(dir.path(), &Manifest::default(), EcSource::Target);

    match result {
        Err(DataError::EmptyResult(msg)) => assert!(msg.contains("growth")),
        other => panic!("expected EmptyResult, got {:?}", other.map(|d| d.load_id)),
    }
    Ok(())
}
