mod ledger;
mod run;

pub(crate) use ledger::{LedgerStore, StoreFormat, inspect_store_format};
pub(crate) use run::run;
