use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use super::ledger::{LedgerStore, RunDetail, SummaryRow};
use crate::cli::PersistArgs;
use crate::commands::validate::read_run_spec;
use crate::model::{
    BenchPaths, COMPARISON_FILE, ComparisonResult, RunSpec, SYNTHESIS_FILE, SynthesisResult,
};
use crate::util::{now_utc_string, read_json, sha256_hex};

#[derive(Debug, Clone, PartialEq)]
pub struct PersistOutcome {
    pub summary_rows: usize,
    pub recovered_from: Option<PathBuf>,
}

pub fn run(args: PersistArgs) -> Result<()> {
    let paths = args.root.paths();
    let spec = read_run_spec(&paths.spec_path)?;
    let output_dir = paths.output_dir(&spec);

    let synthesis = read_json::<SynthesisResult>(&output_dir.join(SYNTHESIS_FILE))?;
    let comparison_path = output_dir.join(COMPARISON_FILE);
    let comparison = if comparison_path.exists() {
        Some(read_json::<ComparisonResult>(&comparison_path)?)
    } else {
        None
    };

    let outcome = persist(&paths, &spec, &synthesis, comparison.as_ref())?;
    info!(
        run_id = %spec.run_id,
        ledger = %paths.ledger_path.display(),
        summary_rows = outcome.summary_rows,
        recovered = outcome.recovered_from.is_some(),
        "persisted run"
    );
    Ok(())
}

pub fn summary_row(
    spec: &RunSpec,
    synthesis: &SynthesisResult,
    comparison: Option<&ComparisonResult>,
    timestamp: &str,
) -> Result<SummaryRow> {
    let spec_bytes = serde_json::to_vec(spec).context("failed to serialize run spec")?;
    Ok(SummaryRow {
        run_id: spec.run_id.clone(),
        timestamp: timestamp.to_string(),
        pipeline_version: spec.pipeline_version.clone(),
        acrue_version: spec.acrue_version.clone(),
        styles: spec.styles.join(", "),
        image_count: spec.image_count,
        winner: synthesis.winner.clone(),
        feasibility_top: synthesis.feasibility_top().map(str::to_string),
        preference_top: synthesis.preference_top().map(str::to_string),
        artifacts_path: spec.output_dir.clone(),
        vs_baseline: comparison.map(|comparison| comparison.baseline_run_id.clone()),
        regressions: comparison.map(|comparison| comparison.summary.regressed),
        improvements: comparison.map(|comparison| comparison.summary.improved),
        run_spec_sha256: sha256_hex(&spec_bytes),
    })
}

pub fn persist(
    paths: &BenchPaths,
    spec: &RunSpec,
    synthesis: &SynthesisResult,
    comparison: Option<&ComparisonResult>,
) -> Result<PersistOutcome> {
    let timestamp = now_utc_string();
    let row = summary_row(spec, synthesis, comparison, &timestamp)?;
    let detail = RunDetail {
        run_id: spec.run_id.clone(),
        winner: synthesis.winner.clone(),
        feasibility_weight: synthesis.weights.feasibility,
        preference_weight: synthesis.weights.preference,
        written_at: timestamp,
        rankings: synthesis.rankings.clone(),
    };

    let mut store = LedgerStore::open_or_create(&paths.ledger_path)?;
    store.record_run(&row, &detail)?;
    let outcome = PersistOutcome {
        summary_rows: store.summary_row_count(&spec.run_id)?,
        recovered_from: store.recovered_from().map(|path| path.to_path_buf()),
    };
    store.close()?;

    Ok(outcome)
}
