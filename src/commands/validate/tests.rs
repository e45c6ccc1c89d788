use std::fs;

use tempfile::TempDir;

use super::checks::{spec_advisories, validate_run_spec};
use crate::commands::test_support::{
    credential_missing, credential_present, paths_in, sample_spec, write_spec,
};
use crate::error::BenchError;

fn validation_failures(error: anyhow::Error) -> Vec<String> {
    match error.downcast::<BenchError>() {
        Ok(BenchError::Validation { failures }) => failures,
        Ok(other) => panic!("unexpected bench error: {other}"),
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn valid_spec_passes_and_is_returned() {
    let temp = TempDir::new().expect("tempdir should be created");
    let paths = paths_in(temp.path());
    let spec = sample_spec("Run_2026_02_04");
    write_spec(&paths, &spec);

    let validated = validate_run_spec(&paths, credential_present).expect("spec should validate");
    assert_eq!(validated, spec);
}

#[test]
fn missing_spec_short_circuits_to_single_failure() {
    let temp = TempDir::new().expect("tempdir should be created");
    let paths = paths_in(temp.path());

    let error = validate_run_spec(&paths, credential_missing).expect_err("missing spec");
    let failures = validation_failures(error);
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("V1 FAIL"), "unexpected: {failures:?}");
}

#[test]
fn unparseable_spec_short_circuits_to_single_failure() {
    let temp = TempDir::new().expect("tempdir should be created");
    let paths = paths_in(temp.path());
    fs::write(&paths.spec_path, "{ not json").expect("fixture should write");

    let error = validate_run_spec(&paths, credential_missing).expect_err("bad json");
    let failures = validation_failures(error);
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("V2 FAIL"), "unexpected: {failures:?}");
}

#[test]
fn absent_image_count_fails_parsing_instead_of_reading_as_zero() {
    let temp = TempDir::new().expect("tempdir should be created");
    let paths = paths_in(temp.path());
    let mut raw = serde_json::to_value(sample_spec("Run_2026_02_04")).expect("spec serializes");
    raw.as_object_mut()
        .expect("spec is an object")
        .remove("image_count");
    fs::write(&paths.spec_path, raw.to_string()).expect("fixture should write");

    let error = validate_run_spec(&paths, credential_present).expect_err("image_count is required");
    let failures = validation_failures(error);
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("V2 FAIL"), "unexpected: {failures:?}");
    assert!(failures[0].contains("image_count"), "unexpected: {failures:?}");
    assert!(!failures[0].contains("got 0"), "unexpected: {failures:?}");
}

#[test]
fn every_failed_precondition_is_reported_together() {
    let temp = TempDir::new().expect("tempdir should be created");
    let paths = paths_in(temp.path());
    let mut spec = sample_spec("Run_2026_02_04");
    spec.styles.pop();
    spec.image_count = 5;
    spec.baseline_run_id = Some("Run_2026_01_01".to_string());
    fs::create_dir_all(paths.output_dir(&spec)).expect("output dir fixture");
    write_spec(&paths, &spec);

    let error = validate_run_spec(&paths, credential_missing).expect_err("should fail");
    let failures = validation_failures(error);
    let tags = failures
        .iter()
        .map(|failure| &failure[..2])
        .collect::<Vec<&str>>();
    assert_eq!(tags, vec!["V3", "V4", "V5", "V6", "V7"]);
}

#[test]
fn existing_baseline_directory_satisfies_the_gate() {
    let temp = TempDir::new().expect("tempdir should be created");
    let paths = paths_in(temp.path());
    let mut spec = sample_spec("Run_2026_02_04");
    spec.baseline_run_id = Some("Run_2026_02_03".to_string());
    fs::create_dir_all(paths.run_dir("Run_2026_02_03")).expect("baseline fixture");
    write_spec(&paths, &spec);

    validate_run_spec(&paths, credential_present).expect("baseline exists");
}

#[test]
fn advisories_flag_unsortable_run_id_and_unbalanced_weights() {
    let mut spec = sample_spec("nightly-run");
    spec.synthesis.feasibility_weight = 0.7;
    spec.synthesis.preference_weight = 0.7;

    let advisories = spec_advisories(&spec).expect("advisories should compute");
    assert_eq!(advisories.len(), 2);
    assert!(advisories[0].contains("nightly-run"));
    assert!(advisories[1].contains("expected 1.0"));

    let clean = spec_advisories(&sample_spec("Run_2026_02_04")).expect("advisories");
    assert!(clean.is_empty(), "unexpected advisories: {clean:?}");
}
