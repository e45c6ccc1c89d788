use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cli::HistoryArgs;
use crate::commands::persist::{LedgerStore, StoreFormat, inspect_store_format};
use crate::model::{BenchPaths, RUN_SPEC_FILE, SYNTHESIS_FILE};
use crate::util::read_json;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub run_id: String,
    pub styles: Vec<String>,
    pub winner: Option<String>,
    pub ledger_rows: usize,
}

#[derive(Debug, Deserialize)]
struct SpecHeader {
    #[serde(default)]
    run_id: Option<String>,
    #[serde(default)]
    styles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WinnerOnly {
    #[serde(default)]
    winner: Option<String>,
}

pub fn run(args: HistoryArgs) -> Result<()> {
    let paths = args.root.paths();
    let entries = collect_history(&paths)?;

    let mut stdout = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &entries)
            .context("failed to serialize history json output")?;
        writeln!(stdout)?;
    } else if entries.is_empty() {
        writeln!(stdout, "No completed runs found.")?;
    } else {
        writeln!(
            stdout,
            "{:<40} {:<30} {:<15} {:>6}",
            "Run ID", "Styles", "Winner", "Rows"
        )?;
        writeln!(stdout, "{}", "-".repeat(94))?;
        for entry in &entries {
            writeln!(
                stdout,
                "{:<40} {:<30} {:<15} {:>6}",
                entry.run_id,
                entry.styles.join(", "),
                entry.winner.as_deref().unwrap_or("N/A"),
                entry.ledger_rows
            )?;
        }
    }
    stdout.flush()?;

    info!(runs = entries.len(), runs_dir = %paths.runs_dir.display(), "history listed");
    Ok(())
}

pub fn collect_history(paths: &BenchPaths) -> Result<Vec<HistoryEntry>> {
    if !paths.runs_dir.is_dir() {
        warn!(runs_dir = %paths.runs_dir.display(), "runs directory missing");
        return Ok(Vec::new());
    }

    let mut run_dirs = fs::read_dir(&paths.runs_dir)
        .with_context(|| format!("failed to list runs in {}", paths.runs_dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_dir() && path.join(RUN_SPEC_FILE).exists())
        .collect::<Vec<_>>();
    run_dirs.sort();

    let ledger = match inspect_store_format(&paths.ledger_path)? {
        StoreFormat::Sqlite => Some(LedgerStore::open_or_create(&paths.ledger_path)?),
        _ => None,
    };

    let mut entries = Vec::with_capacity(run_dirs.len());
    for run_dir in &run_dirs {
        entries.push(history_entry(run_dir, ledger.as_ref())?);
    }

    if let Some(ledger) = ledger {
        ledger.close()?;
    }
    Ok(entries)
}

fn history_entry(run_dir: &Path, ledger: Option<&LedgerStore>) -> Result<HistoryEntry> {
    let spec = read_json::<SpecHeader>(&run_dir.join(RUN_SPEC_FILE))?;
    let run_id = spec.run_id.unwrap_or_else(|| {
        run_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let synthesis_path = run_dir.join(SYNTHESIS_FILE);
    let mut winner = if synthesis_path.exists() {
        read_json::<WinnerOnly>(&synthesis_path)?.winner
    } else {
        None
    };

    let mut ledger_rows = 0;
    if let Some(ledger) = ledger {
        ledger_rows = ledger.summary_row_count(&run_id)?;
        if winner.is_none() {
            winner = ledger.load_detail(&run_id)?.map(|detail| detail.winner);
        }
    }

    Ok(HistoryEntry {
        run_id,
        styles: spec.styles,
        winner,
        ledger_rows,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::collect_history;
    use crate::commands::test_support::{paths_in, sample_spec};
    use crate::util::write_json_pretty;

    #[test]
    fn history_lists_spec_bearing_runs_in_order() {
        let temp = TempDir::new().expect("tempdir should be created");
        let paths = paths_in(temp.path());
        for run_id in ["Run_2026_02_05", "Run_2026_02_03"] {
            let spec = sample_spec(run_id);
            write_json_pretty(&paths.run_dir(run_id).join("run_spec.json"), &spec)
                .expect("spec fixture");
        }
        fs::write(
            paths.run_dir("Run_2026_02_05").join("synthesis.json"),
            r#"{"winner":"Storybook","rankings":[]}"#,
        )
        .expect("synthesis fixture");
        fs::create_dir_all(paths.run_dir("Run_2026_02_04")).expect("spec-less run dir");

        let entries = collect_history(&paths).expect("history should load");
        let listed = entries
            .iter()
            .map(|entry| (entry.run_id.as_str(), entry.winner.as_deref()))
            .collect::<Vec<(&str, Option<&str>)>>();
        assert_eq!(
            listed,
            vec![("Run_2026_02_03", None), ("Run_2026_02_05", Some("Storybook"))]
        );
        assert_eq!(entries[0].styles.len(), 3);
        assert_eq!(entries[0].ledger_rows, 0);
        assert!(!paths.ledger_path.exists());
    }
}
