//! Synthetic census data shared by the integration tests

#![allow(dead_code)]

use census_pipeline::config::PipelineConfig;
use census_pipeline::schema::{vocabulary, EDUCATION};
use census_pipeline::training::{Criterion, TrainerConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::path::Path;

pub const N_ROWS: usize = 640;

const RAW_HEADER: &str = "age, workclass, fnlgt, education, education-num, marital-status, \
    occupation, relationship, race, sex, capital-gain, capital-loss, hours-per-week, \
    native-country, salary";

/// Years of schooling for an education level
pub fn education_num(education: &str) -> i64 {
    let ladder = [
        "Preschool",
        "1st-4th",
        "5th-6th",
        "7th-8th",
        "9th",
        "10th",
        "11th",
        "12th",
        "HS-grad",
        "Some-college",
        "Assoc-voc",
        "Assoc-acdm",
        "Bachelors",
        "Masters",
        "Prof-school",
        "Doctorate",
    ];
    ladder
        .iter()
        .position(|e| *e == education)
        .map(|p| p as i64 + 1)
        .unwrap_or(9)
}

/// Raw census CSV text.
///
/// Categorical values cycle through their vocabularies so every value appears
/// many times. The label is `>50K` exactly when `education-num >= 11`; older
/// and longer-working rows lean towards it too. Every 40th row is followed by
/// a duplicate carrying the `?` missing marker.
pub fn raw_census_csv() -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut out = String::new();
    writeln!(out, "{}", RAW_HEADER).unwrap();

    for i in 0..N_ROWS {
        let pick = |column: &str, shift: usize| -> &'static str {
            let vocab = vocabulary(column).unwrap();
            vocab[(i + shift) % vocab.len()]
        };

        let education = EDUCATION[i % EDUCATION.len()];
        let years = education_num(education);
        let high = years >= 11;

        let age: i64 = if high { rng.gen_range(40..62) } else { rng.gen_range(18..45) };
        let hours: i64 = if high { rng.gen_range(40..60) } else { rng.gen_range(20..45) };
        let fnlgt: i64 = rng.gen_range(20_000..400_000);
        let gain: i64 = if rng.gen_bool(0.1) { rng.gen_range(1..9_999) } else { 0 };

        let row = format!(
            "{}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}",
            age,
            pick("workclass", 0),
            fnlgt,
            education,
            years,
            pick("marital-status", 3),
            pick("occupation", 5),
            pick("relationship", 1),
            pick("race", 2),
            pick("sex", i / 3),
            gain,
            0,
            hours,
            pick("native-country", 11),
            if high { ">50K" } else { "<=50K" },
        );
        writeln!(out, "{}", row).unwrap();

        if i % 40 == 0 {
            writeln!(out, "{}", row.replacen(pick("workclass", 0), "?", 1)).unwrap();
        }
    }

    out
}

/// Pipeline config rooted in `dir` with the raw CSV in place
pub fn seeded_workspace(dir: &Path) -> PipelineConfig {
    let config = PipelineConfig::rooted_at(dir);
    std::fs::create_dir_all(config.raw_data.parent().unwrap()).unwrap();
    std::fs::write(&config.raw_data, raw_census_csv()).unwrap();
    config
}

/// A smaller forest for tests that only need a trained model
pub fn quick_trainer() -> TrainerConfig {
    TrainerConfig {
        n_estimators: 25,
        max_depth: 5,
        criterion: Criterion::Entropy,
        random_state: 42,
        cv_folds: 3,
        cv_seed: 42,
    }
}

pub fn high_income_record() -> Value {
    json!({
        "workclass": "State-gov",
        "education": "Doctorate",
        "marital_status": "Married-civ-spouse",
        "occupation": "Prof-specialty",
        "relationship": "Wife",
        "race": "White",
        "sex": "Female",
        "native_country": "United-States",
        "age": 48,
        "education_num": 16,
        "hours_per_week": 46
    })
}

pub fn low_income_record() -> Value {
    json!({
        "workclass": "Private",
        "education": "HS-grad",
        "marital_status": "Divorced",
        "occupation": "Craft-repair",
        "relationship": "Not-in-family",
        "race": "White",
        "sex": "Male",
        "native_country": "United-States",
        "age": 34,
        "education_num": 9,
        "hours_per_week": 40
    })
}
