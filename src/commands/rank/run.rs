use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use super::aggregate::feasibility_rankings;
use crate::cli::RankArgs;
use crate::commands::validate::read_run_spec;
use crate::model::{ACRUE_FILE, FEASIBILITY_FILE, ItemEvaluation};
use crate::util::{read_json, write_json_pretty};

pub fn run(args: RankArgs) -> Result<()> {
    let paths = args.root.paths();
    let spec = read_run_spec(&paths.spec_path)?;
    let output_dir = paths.output_dir(&spec);

    let items = read_json::<Vec<ItemEvaluation>>(&output_dir.join(ACRUE_FILE))?;
    let rankings = feasibility_rankings(&spec, &items);

    let rankings_path = output_dir.join(FEASIBILITY_FILE);
    write_json_pretty(&rankings_path, &rankings)?;
    info!(
        path = %rankings_path.display(),
        styles = rankings.rankings.len(),
        top = %rankings.rankings.first().map(|ranking| ranking.style.as_str()).unwrap_or_default(),
        "wrote feasibility rankings"
    );

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &rankings)?;
    writeln!(stdout)?;

    Ok(())
}
