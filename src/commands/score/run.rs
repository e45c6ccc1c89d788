use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::Value;
use tracing::{info, warn};

use super::batch::score_batch;
use crate::cli::ScoreArgs;
use crate::commands::validate::read_run_spec;
use crate::model::{ACRUE_FILE, JUDGMENTS_FILE};
use crate::util::{read_json, write_json_pretty};

pub fn run(args: ScoreArgs) -> Result<()> {
    let paths = args.root.paths();
    let spec = read_run_spec(&paths.spec_path)?;
    let output_dir = paths.output_dir(&spec);
    let input_path = args
        .input
        .clone()
        .unwrap_or_else(|| output_dir.join(JUDGMENTS_FILE));

    let records = read_json::<Vec<Value>>(&input_path)?;
    let outcome = score_batch(&records);

    let mut per_style = BTreeMap::<&str, u32>::new();
    for evaluation in &outcome.evaluations {
        *per_style.entry(evaluation.style.as_str()).or_default() += 1;
        if !spec.styles.contains(&evaluation.style) {
            warn!(style = %evaluation.style, item_id = %evaluation.item_id, "scored style is not declared in run spec");
        }
    }
    for style in &spec.styles {
        let count = per_style.get(style.as_str()).copied().unwrap_or(0);
        if count != spec.image_count {
            warn!(style = %style, scored = count, expected = spec.image_count, "incomplete item set for style");
        }
    }

    let acrue_path = output_dir.join(ACRUE_FILE);
    write_json_pretty(&acrue_path, &outcome.evaluations)?;

    info!(
        path = %acrue_path.display(),
        evaluations = outcome.evaluations.len(),
        degraded = outcome.degraded,
        skipped = outcome.skipped,
        "wrote item evaluations"
    );
    Ok(())
}
