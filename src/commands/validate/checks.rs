use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, warn};

use crate::error::BenchError;
use crate::model::{BenchPaths, CANDIDATE_COUNT, ITEM_COUNT, RunSpec};

pub const REQUIRED_CREDENTIALS: &[&str] = &["GEMINI_API_KEY"];
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

pub fn env_credential(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

pub fn read_run_spec(path: &Path) -> Result<RunSpec, BenchError> {
    if !path.exists() {
        return Err(BenchError::not_found("run spec", path));
    }
    let raw = fs::read(path).map_err(|err| BenchError::parse("run spec", err))?;
    serde_json::from_slice(&raw).map_err(|err| BenchError::parse("run spec", err))
}

pub fn validate_run_spec(
    paths: &BenchPaths,
    credential: impl Fn(&str) -> Option<String>,
) -> Result<RunSpec> {
    let spec = match read_run_spec(&paths.spec_path) {
        Ok(spec) => spec,
        Err(BenchError::NotFound { path, .. }) => {
            return Err(BenchError::Validation {
                failures: vec![format!(
                    "V1 FAIL: run_spec.json does not exist at {}",
                    path.display()
                )],
            }
            .into());
        }
        Err(err) => {
            return Err(BenchError::Validation {
                failures: vec![format!("V2 FAIL: run_spec.json is not valid JSON: {err}")],
            }
            .into());
        }
    };

    let failures = precondition_failures(&spec, paths, &credential);
    if !failures.is_empty() {
        return Err(BenchError::Validation { failures }.into());
    }

    for advisory in spec_advisories(&spec)? {
        warn!(run_id = %spec.run_id, advisory = %advisory, "run spec advisory");
    }

    info!(
        run_id = %spec.run_id,
        styles = %spec.styles.join(", "),
        image_count = spec.image_count,
        output_dir = %paths.output_dir(&spec).display(),
        "run spec validation passed"
    );

    Ok(spec)
}

pub fn precondition_failures(
    spec: &RunSpec,
    paths: &BenchPaths,
    credential: &impl Fn(&str) -> Option<String>,
) -> Vec<String> {
    let mut failures = Vec::new();

    if spec.styles.len() != CANDIDATE_COUNT {
        failures.push(format!(
            "V3 FAIL: styles must have exactly {CANDIDATE_COUNT} items, got {}",
            spec.styles.len()
        ));
    }

    if spec.image_count != ITEM_COUNT {
        failures.push(format!(
            "V4 FAIL: image_count must be {ITEM_COUNT}, got {}",
            spec.image_count
        ));
    }

    let output_dir = paths.output_dir(spec);
    if spec.output_dir.trim().is_empty() {
        failures.push("V5 FAIL: output_dir is not set".to_string());
    } else if output_dir.exists() {
        failures.push(format!(
            "V5 FAIL: output_dir already exists: {}",
            output_dir.display()
        ));
    }

    if let Some(baseline_run_id) = spec.baseline_run_id() {
        let baseline_dir = paths.run_dir(baseline_run_id);
        if !baseline_dir.is_dir() {
            failures.push(format!(
                "V6 FAIL: baseline_run_id directory not found: {}",
                baseline_dir.display()
            ));
        }
    }

    for name in REQUIRED_CREDENTIALS {
        let present = credential(name)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false);
        if !present {
            failures.push(format!("V7 FAIL: {name} environment variable not set"));
        }
    }

    failures
}

pub fn spec_advisories(spec: &RunSpec) -> Result<Vec<String>> {
    let run_id_pattern =
        Regex::new(r"^Run_\d{4}_\d{2}_\d{2}").context("failed to compile run id regex")?;

    let mut advisories = Vec::new();
    if !run_id_pattern.is_match(&spec.run_id) {
        advisories.push(format!(
            "run_id '{}' does not follow Run_YYYY_MM_DD naming; baseline auto-resolution orders runs lexicographically",
            spec.run_id
        ));
    }

    let weight_sum = spec.synthesis.feasibility_weight + spec.synthesis.preference_weight;
    if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        advisories.push(format!(
            "synthesis weights sum to {weight_sum}, expected 1.0"
        ));
    }

    Ok(advisories)
}
