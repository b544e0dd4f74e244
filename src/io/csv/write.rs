//! CSV writing operations.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::{CsvWriter, NamedFrom}, series::Series};

use crate::view::ViewState;

/// Write a DataFrame to a CSV file.
fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::csv::write] Failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(df)
        .with_context(|| format!("[io::csv::write] Failed to write CSV to {:?}", path))
}

/// Write a DataFrame to a CSV string (for WASM/browser use).
fn write_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .finish(df)
        .context("[io::csv::write] Failed to write CSV to string")?;
    String::from_utf8(buffer)
        .context("[io::csv::write] CSV output is not valid UTF-8")
}

/// One row per feature: what the map currently shows for it under the view's
/// year and filters. `value` is empty when the feature has no data.
fn feature_table(state: &ViewState, layers: &[usize]) -> Result<DataFrame> {
    let year = state.current_year();
    let features: Vec<_> = state.boundaries().features()
        .filter(|f| layers.is_empty() || layers.contains(&f.layer))
        .collect();

    let handles: Vec<u32> = features.iter().map(|f| f.handle.0).collect();
    let layer: Vec<u32> = features.iter().map(|f| f.layer as u32).collect();
    let geo_codes: Vec<&str> = features.iter().map(|f| &*f.geo_code).collect();
    let names: Vec<&str> = features.iter().map(|f| f.name.as_str()).collect();
    let values: Vec<Option<f64>> = features.iter().map(|f| state.value_of(f.handle)).collect();
    let colors: Vec<String> = features.iter().map(|f| state.color_of(f.handle).to_string()).collect();

    Ok(DataFrame::new(vec![
        Series::new("handle".into(), handles).into(),
        Series::new("layer".into(), layer).into(),
        Series::new("geo_code".into(), geo_codes).into(),
        Series::new("name".into(), names).into(),
        Series::new("year".into(), vec![year; features.len()]).into(),
        Series::new("value".into(), values).into(),
        Series::new("color".into(), colors).into(),
    ])?)
}

/// Write the current feature table to a CSV file. An empty `layers` slice means every layer.
pub fn write_feature_table(state: &ViewState, layers: &[usize], path: &Path) -> Result<()> {
    let mut df = feature_table(state, layers)?;
    write_csv(&mut df, path)
}

/// Write the current feature table to a CSV string (for WASM/browser use).
pub fn write_feature_table_string(state: &ViewState, layers: &[usize]) -> Result<String> {
    let mut df = feature_table(state, layers)?;
    write_csv_string(&mut df)
}

#[cfg(test)]
mod tests {
    use super::{write_feature_table, write_feature_table_string};
    use crate::{
        boundary::fixtures::{collection, layer_config, square},
        config::MapConfig,
        data::Record,
        view::ViewState,
    };

    fn state() -> ViewState {
        let config = MapConfig {
            geo_layers: vec![layer_config(0.0, 6.0, None), layer_config(7.0, 20.0, None)],
            legend_items: 2,
            ..MapConfig::default()
        };
        let docs = vec![
            collection(vec![square("R1", "North", 0.0, 0.0), square("R2", "South", 0.0, -1.0)]),
            collection(vec![square("L1", "Town", 0.0, 0.0)]),
        ];
        let records = vec![Record::new("R1", 2015, Some(10.0)), Record::new("R2", 2015, Some(30.0))];
        ViewState::new(config, records, &docs).unwrap()
    }

    #[test]
    fn one_row_per_feature() {
        let csv = write_feature_table_string(&state(), &[]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "handle,layer,geo_code,name,year,value,color");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("0,0,R1,North,2015,10"));
        // No data: empty value, no-data color.
        assert!(lines[3].starts_with("2,1,L1,Town,2015,,#f0f0f0"));
    }

    #[test]
    fn layer_subset_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        write_feature_table(&state(), &[1], &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("L1"));
    }
}
