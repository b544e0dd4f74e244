//! CSV format reading and writing operations.

mod read;
mod write;

pub use read::{read_records_csv, read_records_csv_str};
pub use write::{write_feature_table, write_feature_table_string};
