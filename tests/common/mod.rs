//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::{fs, path::Path};

use rust_xlsxwriter::Workbook;
use unicode_normalization::UnicodeNormalization;

pub const WORKBOOK: &str = "4개교_생육결과데이터.xlsx";

/// Unicode form used when writing a name to disk.
#[derive(Debug, Clone, Copy)]
pub enum Form {
    Nfc,
    Nfd,
}

pub fn render(name: &str, form: Form) -> String {
    match form {
        Form::Nfc => name.nfc().collect(),
        Form::Nfd => name.nfd().collect(),
    }
}

/// Write `{school}_환경데이터.csv` with one row per EC value.
pub fn write_env(dir: &Path, school: &str, ecs: &[f64], form: Form) {
    // ---
    let mut body = String::from("time,temperature,humidity,ph,ec\n");
    for (i, ec) in ecs.iter().enumerate() {
        body.push_str(&format!(
            "2025-05-{:02} 12:00:00,{},{},6.{},{}\n",
            i + 1,
            18.0 + i as f64,
            50.0 + i as f64,
            i % 10,
            ec
        ));
    }
    let name = render(&format!("{}_환경데이터.csv", school), form);
    fs::write(dir.join(name), body).unwrap();
}

/// Write the growth workbook: one sheet per school, one row per biomass value.
pub fn write_growth(dir: &Path, sheets: &[(&str, Vec<f64>)], form: Form) {
    // ---
    let mut workbook = Workbook::new();
    for (school, biomass) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(render(school, form)).unwrap();
        sheet.write_string(0, 0, "생중량(g)").unwrap();
        sheet.write_string(0, 1, "잎 수(장)").unwrap();
        sheet.write_string(0, 2, "지상부 길이(mm)").unwrap();
        for (i, b) in biomass.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_number(row, 0, *b).unwrap();
            sheet.write_number(row, 1, 5.0 + i as f64).unwrap();
            sheet.write_number(row, 2, 80.0 + 10.0 * i as f64).unwrap();
        }
    }
    workbook.save(dir.join(render(WORKBOOK, form))).unwrap();
}

/// Growth sheets for the four-school scenario: EC 1, 2, 4, 8 with mean
/// biomass 3 g, 6 g, 4 g, 2 g.
pub fn four_school_growth() -> Vec<(&'static str, Vec<f64>)> {
    vec![
        ("송도고", vec![2.0, 3.0, 4.0]),
        ("하늘고", vec![5.0, 6.0, 7.0, 6.0]),
        ("아라고", vec![3.0, 5.0]),
        ("동산고", vec![1.0, 2.0, 3.0, 2.0, 2.0]),
    ]
}

/// Write a complete four-school data directory. Odd schools use NFD names.
pub fn write_four_schools(dir: &Path) {
    // ---
    write_env(dir, "송도고", &[1.0, 1.1, 0.9], Form::Nfc);
    write_env(dir, "하늘고", &[2.0, 2.1], Form::Nfd);
    write_env(dir, "아라고", &[4.2, 3.8, 4.0, 4.0], Form::Nfc);
    write_env(dir, "동산고", &[8.0], Form::Nfd);
    write_growth(dir, &four_school_growth(), Form::Nfc);
}
