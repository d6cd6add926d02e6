pub mod duckdb_storage;
pub mod plugins;
pub mod storage;

#[cfg(test)]
pub mod test_utils;

pub use duckdb_storage::*;
pub use plugins::*;
pub use storage::*;
