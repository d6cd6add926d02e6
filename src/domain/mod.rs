pub mod date_range;
pub mod day;
pub mod day_fetcher;
pub mod entry;
pub mod error;
pub mod metabolism;
pub mod profile;

pub use date_range::*;
pub use day::*;
pub use day_fetcher::*;
pub use entry::*;
pub use error::*;
pub use metabolism::*;
pub use profile::*;
