use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Lexicographically greatest id other than `current`. Run ids follow
/// `Run_YYYY_MM_DD[...]`, so this is the most recent prior run.
pub fn pick_latest_prior<'a>(
    run_ids: impl IntoIterator<Item = &'a str>,
    current: &str,
) -> Option<&'a str> {
    run_ids.into_iter().filter(|run_id| *run_id != current).max()
}

pub fn latest_prior_run(runs_dir: &Path, current: &str) -> Result<Option<String>> {
    if !runs_dir.is_dir() {
        return Ok(None);
    }

    let mut run_ids = Vec::<String>::new();
    for entry in fs::read_dir(runs_dir)
        .with_context(|| format!("failed to list runs in {}", runs_dir.display()))?
    {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", runs_dir.display()))?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            run_ids.push(name.to_string());
        }
    }

    Ok(pick_latest_prior(run_ids.iter().map(String::as_str), current).map(str::to_string))
}

pub fn resolve_baseline(
    runs_dir: &Path,
    current: &str,
    explicit: Option<&str>,
) -> Result<Option<String>> {
    match explicit.map(str::trim).filter(|run_id| !run_id.is_empty()) {
        Some(run_id) => Ok(Some(run_id.to_string())),
        None => latest_prior_run(runs_dir, current),
    }
}
