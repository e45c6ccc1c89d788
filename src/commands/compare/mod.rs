mod baseline;
mod diff;
mod report;
mod run;
mod sources;

pub(crate) use report::{format_delta, format_score};
pub(crate) use run::{run, run_comparison};
