use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::de::DeserializeOwned;
use tracing::info;

use super::merge::{rank_map, synthesize};
use super::report::{ReportInputs, render_report};
use crate::cli::SynthesizeArgs;
use crate::commands::compare::run_comparison;
use crate::commands::validate::read_run_spec;
use crate::error::BenchError;
use crate::model::{
    BenchPaths, FEASIBILITY_FILE, JudgeRankings, LEGACY_FEASIBILITY_FILE,
    LEGACY_PREFERENCE_FILE, PREFERENCE_FILE, PreferenceRankings, REPORT_FILE, RunSpec,
    SYNTHESIS_FILE, SynthesisResult,
};
use crate::util::{first_existing, now_utc_string, read_json, write_json_pretty, write_text};

pub fn run(args: SynthesizeArgs) -> Result<()> {
    let paths = args.root.paths();
    let spec = read_run_spec(&paths.spec_path)?;
    let synthesis = synthesize_run(&paths, &spec, !args.skip_compare)?;

    println!("Winner: {}", synthesis.winner);
    Ok(())
}

pub fn synthesize_run(paths: &BenchPaths, spec: &RunSpec, compare: bool) -> Result<SynthesisResult> {
    let output_dir = paths.output_dir(spec);

    let feasibility = read_judge_document::<JudgeRankings>(
        &output_dir,
        "feasibility rankings",
        &[FEASIBILITY_FILE, LEGACY_FEASIBILITY_FILE],
    )?;
    let preference = read_judge_document::<PreferenceRankings>(
        &output_dir,
        "preference rankings",
        &[PREFERENCE_FILE, LEGACY_PREFERENCE_FILE],
    )?;

    let synthesis = synthesize(
        spec,
        &rank_map(
            feasibility
                .rankings
                .iter()
                .map(|ranking| (ranking.style.as_str(), ranking.rank)),
        ),
        &rank_map(
            preference
                .rankings
                .iter()
                .map(|ranking| (ranking.style.as_str(), ranking.rank)),
        ),
    )?;

    let synthesis_path = output_dir.join(SYNTHESIS_FILE);
    write_json_pretty(&synthesis_path, &synthesis)?;
    info!(
        run_id = %spec.run_id,
        winner = %synthesis.winner,
        path = %synthesis_path.display(),
        "wrote synthesis"
    );

    let comparison = if compare {
        run_comparison(paths, spec)
    } else {
        None
    };

    let generated_at = now_utc_string();
    let report = render_report(&ReportInputs {
        spec,
        feasibility: &feasibility,
        preference: &preference,
        synthesis: &synthesis,
        comparison: comparison.as_ref(),
        generated_at: &generated_at,
    })?;
    let report_path = output_dir.join(REPORT_FILE);
    write_text(&report_path, &report)?;
    info!(
        path = %report_path.display(),
        with_comparison = comparison.is_some(),
        "wrote run report"
    );

    Ok(synthesis)
}

fn read_judge_document<T: DeserializeOwned>(
    output_dir: &Path,
    what: &str,
    names: &[&str],
) -> Result<T> {
    let Some(path) = first_existing(output_dir, names) else {
        let expected: PathBuf = output_dir.join(names[0]);
        return Err(BenchError::not_found(what, expected).into());
    };
    read_json(&path)
}
