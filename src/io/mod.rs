//! IO module for format-specific reading and writing operations.
//!
//! Organized by format rather than domain:
//!
//! - `csv` - indicator records in, feature tables out
//! - `json` - indicator records as a JSON array of row objects
//! - `svg` - static choropleth snapshots

mod csv;
mod json;
mod svg;

pub use csv::{read_records_csv, read_records_csv_str, write_feature_table, write_feature_table_string};
pub use json::{read_records_json, records_from_json};
pub use svg::{render_svg, render_svg_string};
