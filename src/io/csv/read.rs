//! CSV reading operations.

use std::{fs::File, io::Cursor, path::Path};

use anyhow::{Context, Result, anyhow, bail};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, CsvReader}};

use crate::data::{GEOCODE_COLUMN, Record, VALUE_COLUMN, YEAR_COLUMN};

/// Reads indicator records from a CSV file at `path`.
pub fn read_records_csv(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    let df = text_options()
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))?;
    records_from_frame(&df)
        .with_context(|| format!("[io::csv::read] Invalid records in {}", path.display()))
}

/// Reads indicator records from CSV text (for WASM/browser use).
pub fn read_records_csv_str(csv: &str) -> Result<Vec<Record>> {
    let df = CsvReader::new(Cursor::new(csv.as_bytes()))
        .with_options(text_options())
        .finish()
        .context("[io::csv::read] Failed to read CSV from string")?;
    records_from_frame(&df)
}

/// Every column is read as text so that geocodes keep leading zeros and
/// categorical values keep their exact spelling; numbers are parsed per row.
fn text_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
}

/// Convert a text-typed frame into records. `GeoCode`, `Year` and `Value` are required columns;
/// every other column becomes a categorical field. Rows without a geocode or year are skipped.
fn records_from_frame(df: &DataFrame) -> Result<Vec<Record>> {
    let names: Vec<String> = df.get_column_names().into_iter().map(|n| n.to_string()).collect();
    for required in [GEOCODE_COLUMN, YEAR_COLUMN, VALUE_COLUMN] {
        if !names.iter().any(|n| n == required) {
            bail!("[io::csv::read] Missing required column {required:?} (found {names:?})");
        }
    }

    let geo_codes = text_column(df, GEOCODE_COLUMN)?;
    let years = text_column(df, YEAR_COLUMN)?;
    let values = text_column(df, VALUE_COLUMN)?;
    let mut extras = Vec::new();
    for name in names.iter().filter(|n| !matches!(n.as_str(), GEOCODE_COLUMN | YEAR_COLUMN | VALUE_COLUMN)) {
        extras.push((name.as_str(), text_column(df, name)?));
    }

    let mut records = Vec::with_capacity(df.height());
    let mut skipped = 0usize;
    for row in 0..df.height() {
        let (Some(geo_code), Some(year)) = (non_empty(geo_codes[row]), non_empty(years[row])) else {
            skipped += 1;
            continue;
        };
        let year = parse_year(year)
            .with_context(|| format!("[io::csv::read] Row {}: invalid {YEAR_COLUMN} {year:?}", row + 1))?;
        let value = non_empty(values[row])
            .map(|v| v.parse::<f64>())
            .transpose()
            .with_context(|| format!("[io::csv::read] Row {}: invalid {VALUE_COLUMN} {:?}", row + 1, values[row]))?;

        let mut record = Record::new(geo_code, year, value);
        for (name, column) in &extras {
            if let Some(v) = non_empty(column[row]) {
                record.fields.insert(name.to_string(), v.to_string());
            }
        }
        records.push(record);
    }

    if skipped > 0 {
        tracing::debug!("[io::csv::read] Skipped {skipped} rows without {GEOCODE_COLUMN} or {YEAR_COLUMN}");
    }
    Ok(records)
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<Vec<Option<&'a str>>> {
    Ok(df.column(name)?.str()
        .map_err(|e| anyhow!("[io::csv::read] Column {name:?} is not text: {e}"))?
        .into_iter()
        .collect())
}

fn non_empty(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|s| !s.is_empty())
}

/// Years may be written as `2015` or `2015.0`.
fn parse_year(text: &str) -> Result<i32> {
    if let Ok(year) = text.parse::<i32>() { return Ok(year) }
    let f = text.parse::<f64>()?;
    if f.fract() != 0.0 || f < i32::MIN as f64 || f > i32::MAX as f64 {
        bail!("{text:?} is not a whole year");
    }
    Ok(f as i32)
}

#[cfg(test)]
mod tests {
    use super::{read_records_csv, read_records_csv_str};

    const CSV: &str = "\
Year,Sex,GeoCode,Value
2015,,E12000001,10
2015,Female,E12000001,9.5
2016,,E12000001,
2015,,,42
2015.0,,01001,3
";

    #[test]
    fn reads_core_columns_and_fields() {
        let records = read_records_csv_str(CSV).unwrap();
        assert_eq!(records.len(), 4); // the row without a geocode is skipped

        assert_eq!(&*records[0].geo_code, "E12000001");
        assert_eq!(records[0].year, 2015);
        assert_eq!(records[0].value, Some(10.0));
        assert_eq!(records[0].field("Sex"), None);

        assert_eq!(records[1].field("Sex"), Some("Female"));
        assert_eq!(records[2].value, None);

        // Leading zeros survive and float-formatted years are accepted.
        assert_eq!(&*records[3].geo_code, "01001");
        assert_eq!(records[3].year, 2015);
    }

    #[test]
    fn missing_required_column() {
        let err = read_records_csv_str("GeoCode,Year\nA,2015\n").unwrap_err();
        assert!(err.to_string().contains("Value"));
    }

    #[test]
    fn bad_numbers_are_reported() {
        assert!(read_records_csv_str("GeoCode,Year,Value\nA,twenty,1\n").is_err());
        assert!(read_records_csv_str("GeoCode,Year,Value\nA,2015,lots\n").is_err());
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, CSV).unwrap();
        assert_eq!(read_records_csv(&path).unwrap().len(), 4);
    }
}
