mod merge;
mod report;
mod run;

pub(crate) use run::run;
#[cfg(test)]
pub(crate) use merge::{rank_map, synthesize};
