use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::cli::InitArgs;
use crate::commands::validate::{env_credential, validate_run_spec};
use crate::model::{BenchPaths, RUN_SPEC_FILE, RunSpec};
use crate::util::{ensure_directory, write_json_pretty};

pub fn run(args: InitArgs) -> Result<()> {
    let paths = args.root.paths();
    let spec = validate_run_spec(&paths, env_credential)?;
    let output_dir = init_output_dir(&paths, &spec)?;

    info!(
        run_id = %spec.run_id,
        output_dir = %output_dir.display(),
        "initialized run directory"
    );
    Ok(())
}

pub fn init_output_dir(paths: &BenchPaths, spec: &RunSpec) -> Result<PathBuf> {
    let output_dir = paths.output_dir(spec);
    ensure_directory(&output_dir.join("originals"))?;
    ensure_directory(&output_dir.join("restyled"))?;
    write_json_pretty(&output_dir.join(RUN_SPEC_FILE), spec)?;
    Ok(output_dir)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::init_output_dir;
    use crate::commands::test_support::{paths_in, sample_spec};
    use crate::model::{RUN_SPEC_FILE, RunSpec};
    use crate::util::read_json;

    #[test]
    fn init_creates_layout_and_spec_copy() {
        let temp = TempDir::new().expect("tempdir should be created");
        let paths = paths_in(temp.path());
        let spec = sample_spec("Run_2026_02_04");

        let output_dir = init_output_dir(&paths, &spec).expect("init should succeed");
        assert!(output_dir.join("originals").is_dir());
        assert!(output_dir.join("restyled").is_dir());

        let copied: RunSpec =
            read_json(&output_dir.join(RUN_SPEC_FILE)).expect("spec copy should parse");
        assert_eq!(copied, spec);
    }
}
