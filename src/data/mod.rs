//! Indicator records and the point-lookup index over them.

mod filter;
mod index;
mod record;

pub use filter::{FieldSelection, FilterSelection};
pub use index::{DatasetIndex, ValueRange};
pub use record::Record;
pub(crate) use record::{GEOCODE_COLUMN, VALUE_COLUMN, YEAR_COLUMN};
