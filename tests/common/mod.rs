//! Shared fixtures for the integration tests

#![allow(dead_code)]

use salary_predictor::ml::RawRecord;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "years_experience,education_level,job_title,city,company_size,skills_python,skills_java,skills_aws,skills_sql,salary_in_inr";

const EDUCATION: [&str; 4] = ["High School", "Bachelor", "Master", "PhD"];
const JOBS: [&str; 4] = ["Data Analyst", "Backend Engineer", "Data Scientist", "ML Engineer"];
const CITIES: [&str; 3] = ["Pune", "Bengaluru", "Mumbai"];
const SIZES: [&str; 3] = ["Small", "Medium", "Large"];

/// The canonical valid request
pub fn valid_raw_record() -> RawRecord {
    RawRecord::new()
        .with("years_experience", 3i64)
        .with("education_level", "Bachelor")
        .with("job_title", "Backend Engineer")
        .with("city", "Pune")
        .with("company_size", "Medium")
        .with("skills_python", 1i64)
        .with("skills_java", 0i64)
        .with("skills_aws", 0i64)
        .with("skills_sql", 1i64)
}

pub fn valid_json_body() -> String {
    serde_json::json!({
        "years_experience": 3,
        "education_level": "Bachelor",
        "job_title": "Backend Engineer",
        "city": "Pune",
        "company_size": "Medium",
        "skills_python": 1,
        "skills_java": 0,
        "skills_aws": 0,
        "skills_sql": 1
    })
    .to_string()
}

/// Deterministic labeled CSV whose salary is an exact linear function of the
/// encoded features plus a small periodic perturbation
pub fn synthetic_csv(n: usize) -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');

    for i in 0..n {
        let years = (i * 7 % 25) as f64 + if i % 2 == 0 { 0.0 } else { 0.5 };
        let education = i % EDUCATION.len();
        let job = (i / 2) % JOBS.len();
        let city = (i / 3) % CITIES.len();
        let size = (i / 5) % SIZES.len();
        let python = i % 2;
        let java = (i / 2) % 2;
        let aws = (i / 3) % 2;
        let sql = (i / 7) % 2;

        let salary = 400_000.0
            + 90_000.0 * years
            + 200_000.0 * education as f64
            + 150_000.0 * job as f64
            + 100_000.0 * city as f64
            + 120_000.0 * size as f64
            + 80_000.0 * python as f64
            + 40_000.0 * java as f64
            + 110_000.0 * aws as f64
            + 30_000.0 * sql as f64
            + ((i % 5) as f64 - 2.0) * 5_000.0;

        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            years,
            EDUCATION[education],
            JOBS[job],
            CITIES[city],
            SIZES[size],
            python,
            java,
            aws,
            sql,
            salary
        ));
    }

    csv
}

/// Write a synthetic dataset of `n` rows under `dir`
pub fn write_dataset(dir: &Path, n: usize) -> PathBuf {
    let path = dir.join("salary_data.csv");
    std::fs::write(&path, synthetic_csv(n)).unwrap();
    path
}
