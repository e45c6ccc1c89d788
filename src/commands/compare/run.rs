use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::{info, warn};

use super::baseline::resolve_baseline;
use super::diff::compare_scores;
use super::report::{log_comparison, render_comparison_markdown};
use super::sources::load_run_scores;
use crate::cli::CompareArgs;
use crate::commands::validate::read_run_spec;
use crate::error::BenchError;
use crate::model::{
    BenchPaths, COMPARISON_FILE, COMPARISON_REPORT_FILE, ComparisonResult, RunSpec,
};
use crate::util::{now_utc_string, write_json_pretty, write_text};

pub fn run(args: CompareArgs) -> Result<()> {
    let paths = args.root.paths();
    let spec = if paths.spec_path.exists() {
        Some(read_run_spec(&paths.spec_path)?)
    } else {
        None
    };

    let Some(current_id) = args
        .current
        .clone()
        .or_else(|| spec.as_ref().map(|spec| spec.run_id.clone()))
    else {
        bail!(
            "no current run: pass --current or provide {}",
            paths.spec_path.display()
        );
    };

    let spec_baseline = spec
        .as_ref()
        .filter(|spec| spec.run_id == current_id)
        .and_then(RunSpec::baseline_run_id);
    let explicit = args.baseline.as_deref().or(spec_baseline);
    let Some(baseline_id) = resolve_baseline(&paths.runs_dir, &current_id, explicit)? else {
        return Err(BenchError::not_found(
            format!("baseline run prior to {current_id}"),
            &paths.runs_dir,
        )
        .into());
    };

    let current_dir = current_run_dir(&paths, spec.as_ref(), &current_id);
    let comparison = compare_runs(
        &current_id,
        &current_dir,
        &baseline_id,
        &paths.run_dir(&baseline_id),
    )?;
    log_comparison(&comparison);

    let output_dir = args.output.clone().unwrap_or(current_dir);
    save_comparison(&output_dir, &comparison)?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &comparison)?;
    writeln!(stdout)?;

    Ok(())
}

pub fn current_run_dir(paths: &BenchPaths, spec: Option<&RunSpec>, run_id: &str) -> PathBuf {
    match spec {
        Some(spec) if spec.run_id == run_id && !spec.output_dir.is_empty() => {
            paths.output_dir(spec)
        }
        _ => paths.run_dir(run_id),
    }
}

pub fn compare_runs(
    current_id: &str,
    current_dir: &Path,
    baseline_id: &str,
    baseline_dir: &Path,
) -> Result<ComparisonResult> {
    let current = load_run_scores(current_dir, current_id)?;
    let baseline = load_run_scores(baseline_dir, baseline_id)?;
    Ok(compare_scores(&current, &baseline, now_utc_string()))
}

pub fn save_comparison(output_dir: &Path, comparison: &ComparisonResult) -> Result<()> {
    let json_path = output_dir.join(COMPARISON_FILE);
    write_json_pretty(&json_path, comparison)?;

    let markdown_path = output_dir.join(COMPARISON_REPORT_FILE);
    write_text(&markdown_path, &render_comparison_markdown(comparison)?)?;

    info!(
        path = %json_path.display(),
        report = %markdown_path.display(),
        verdict = comparison.summary.overall_verdict.as_str(),
        "wrote comparison"
    );
    Ok(())
}

pub fn run_comparison(paths: &BenchPaths, spec: &RunSpec) -> Option<ComparisonResult> {
    let baseline_id = match resolve_baseline(&paths.runs_dir, &spec.run_id, spec.baseline_run_id())
    {
        Ok(Some(baseline_id)) => baseline_id,
        Ok(None) => {
            info!(run_id = %spec.run_id, "no prior run to compare against");
            return None;
        }
        Err(err) => {
            warn!(run_id = %spec.run_id, error = %err, "baseline resolution failed; skipping comparison");
            return None;
        }
    };

    let current_dir = paths.output_dir(spec);
    let outcome = compare_runs(
        &spec.run_id,
        &current_dir,
        &baseline_id,
        &paths.run_dir(&baseline_id),
    )
    .and_then(|comparison| {
        save_comparison(&current_dir, &comparison)?;
        Ok(comparison)
    });

    match outcome {
        Ok(comparison) => {
            log_comparison(&comparison);
            Some(comparison)
        }
        Err(err) => {
            warn!(
                run_id = %spec.run_id,
                baseline_run_id = %baseline_id,
                error = %format!("{err:#}"),
                "comparison failed; continuing without it"
            );
            None
        }
    }
}
