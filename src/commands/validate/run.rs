use std::io::{self, Write};

use anyhow::Result;

use super::checks::{env_credential, validate_run_spec};
use crate::cli::ValidateArgs;

pub fn run(args: ValidateArgs) -> Result<()> {
    let paths = args.root.paths();
    let spec = validate_run_spec(&paths, env_credential)?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &spec)?;
    writeln!(stdout)?;

    Ok(())
}
