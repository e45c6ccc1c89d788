mod aggregate;
mod run;

pub(crate) use run::run;
#[cfg(test)]
pub(crate) use aggregate::rank_items;
