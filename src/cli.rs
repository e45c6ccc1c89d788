use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::BenchPaths;

#[derive(Parser, Debug)]
#[command(
    name = "restyle-bench",
    version,
    about = "Restyle benchmark scoring, ranking and regression tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Validate(ValidateArgs),
    Init(InitArgs),
    Score(ScoreArgs),
    Rank(RankArgs),
    Synthesize(SynthesizeArgs),
    Compare(CompareArgs),
    Persist(PersistArgs),
    History(HistoryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RootArgs {
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,

    #[arg(long)]
    pub runs_dir: Option<PathBuf>,

    #[arg(long)]
    pub ledger_path: Option<PathBuf>,

    #[arg(long)]
    pub spec_path: Option<PathBuf>,
}

impl RootArgs {
    pub fn paths(&self) -> BenchPaths {
        let defaults = BenchPaths::from_root(&self.project_root);
        BenchPaths {
            project_root: defaults.project_root,
            runs_dir: self.runs_dir.clone().unwrap_or(defaults.runs_dir),
            ledger_path: self.ledger_path.clone().unwrap_or(defaults.ledger_path),
            spec_path: self.spec_path.clone().unwrap_or(defaults.spec_path),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub root: RootArgs,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    #[command(flatten)]
    pub root: RootArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub root: RootArgs,

    /// Judge output to score; defaults to judgments.json in the run directory.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RankArgs {
    #[command(flatten)]
    pub root: RootArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SynthesizeArgs {
    #[command(flatten)]
    pub root: RootArgs,

    #[arg(long, default_value_t = false)]
    pub skip_compare: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub root: RootArgs,

    #[arg(long)]
    pub current: Option<String>,

    #[arg(long)]
    pub baseline: Option<String>,

    /// Directory for comparison.json; defaults to the current run's output directory.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PersistArgs {
    #[command(flatten)]
    pub root: RootArgs,
}

#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub root: RootArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
