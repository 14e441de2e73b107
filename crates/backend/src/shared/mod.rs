pub mod config;
pub mod data;
pub mod error;
pub mod format;

#[cfg(test)]
pub mod test_support;
