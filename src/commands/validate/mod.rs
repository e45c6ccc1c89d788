mod checks;
mod run;
#[cfg(test)]
mod tests;

pub(crate) use checks::{env_credential, read_run_spec, validate_run_spec};
pub(crate) use run::run;
