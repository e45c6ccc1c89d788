mod batch;
mod run;
mod scoring;

pub(crate) use run::run;
#[cfg(test)]
pub(crate) use scoring::score_item;
