mod cli;
mod commands;
mod error;
mod model;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Init(args) => commands::init::run(args),
        Commands::Score(args) => commands::score::run(args),
        Commands::Rank(args) => commands::rank::run(args),
        Commands::Synthesize(args) => commands::synthesize::run(args),
        Commands::Compare(args) => commands::compare::run(args),
        Commands::Persist(args) => commands::persist::run(args),
        Commands::History(args) => commands::history::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
