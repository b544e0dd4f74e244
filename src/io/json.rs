//! Indicator records as JSON: an array of row objects, as served to the widget by the page.

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::data::{GEOCODE_COLUMN, Record, YEAR_COLUMN};

/// Parse records from a JSON array of row objects. Rows with a missing, null or empty
/// `GeoCode` or `Year` are skipped; any other malformed row is an error.
pub fn records_from_json(rows: &Value) -> Result<Vec<Record>> {
    let rows = rows.as_array()
        .ok_or_else(|| anyhow!("[io::json] Records must be a JSON array of objects"))?;

    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for (i, row) in rows.iter().enumerate() {
        if row.is_object() && (blank(row.get(GEOCODE_COLUMN)) || blank(row.get(YEAR_COLUMN))) {
            skipped += 1;
            continue;
        }
        records.push(Record::from_json(row).with_context(|| format!("[io::json] Record {i}"))?);
    }
    if skipped > 0 {
        tracing::debug!("[io::json] Skipped {skipped} rows without {GEOCODE_COLUMN} or {YEAR_COLUMN}");
    }
    Ok(records)
}

fn blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Read records from a JSON file.
pub fn read_records_json(path: &Path) -> Result<Vec<Record>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("[io::json] Failed to read {}", path.display()))?;
    let rows: Value = serde_json::from_str(&text)
        .with_context(|| format!("[io::json] {} is not valid JSON", path.display()))?;
    records_from_json(&rows)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{read_records_json, records_from_json};

    #[test]
    fn parses_rows() {
        let rows = json!([
            { "GeoCode": "E12000001", "Year": 2015, "Value": 10.5, "Sex": "Female" },
            { "GeoCode": "E12000002", "Year": "2016", "Value": null }
        ]);
        let records = records_from_json(&rows).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field("Sex"), Some("Female"));
        assert_eq!(records[1].year, 2016);
        assert_eq!(records[1].value, None);
    }

    #[test]
    fn bad_row_names_its_index() {
        let rows = json!([{ "GeoCode": "A", "Year": 2015, "Value": 1 }, { "GeoCode": "B", "Year": "twenty" }]);
        let err = records_from_json(&rows).unwrap_err();
        assert!(format!("{err:#}").contains("Record 1"));

        let rows = json!([{ "GeoCode": "A", "Year": 2015, "Value": "lots" }]);
        assert!(records_from_json(&rows).is_err());
        assert!(records_from_json(&json!({ "GeoCode": "A" })).is_err());
        assert!(records_from_json(&json!([["A", 2015, 1]])).is_err());
    }

    #[test]
    fn skips_rows_without_geocode_or_year() {
        let rows = json!([
            { "GeoCode": null, "Year": 2015, "Value": 99 },
            { "GeoCode": "E12000001", "Year": 2015, "Value": 10 },
            { "Year": 2016, "Value": 98 },
            { "GeoCode": " ", "Year": 2016, "Value": 97 },
            { "GeoCode": "E12000002", "Year": "", "Value": 96 },
            { "GeoCode": "E12000003", "Value": 95 }
        ]);
        let records = records_from_json(&rows).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(&*records[0].geo_code, "E12000001");
        assert_eq!(records[0].value, Some(10.0));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"[{"GeoCode": "A", "Year": 2015, "Value": 1}]"#).unwrap();
        assert_eq!(read_records_json(&path).unwrap().len(), 1);
    }
}
