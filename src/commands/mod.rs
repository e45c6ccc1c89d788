pub mod compare;
pub mod history;
pub mod init;
pub mod persist;
pub mod rank;
pub mod score;
pub mod synthesize;
pub mod validate;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;
