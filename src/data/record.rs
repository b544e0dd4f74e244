use std::{collections::BTreeMap, sync::Arc};

use anyhow::{Result, anyhow, bail};
use serde_json::Value;

/// Column holding the geographic join key.
pub(crate) const GEOCODE_COLUMN: &str = "GeoCode";
/// Column holding the observation year.
pub(crate) const YEAR_COLUMN: &str = "Year";
/// Column holding the indicator value.
pub(crate) const VALUE_COLUMN: &str = "Value";

/// One observed indicator value for one region in one year,
/// optionally disaggregated by categorical fields (sex, age group, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub geo_code: Arc<str>,
    pub year: i32,
    pub value: Option<f64>, // None when the source row has no value
    pub fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new(geo_code: impl Into<Arc<str>>, year: i32, value: Option<f64>) -> Self {
        Self { geo_code: geo_code.into(), year, value, fields: BTreeMap::new() }
    }

    /// Builder-style helper to attach a categorical field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Value of a categorical field, if the record carries it.
    #[inline]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Parse a record from a JSON object such as `{"GeoCode": "E12000001", "Year": 2015, "Value": 3.2, "Sex": "Female"}`.
    /// Categorical fields may be strings, numbers or booleans; nulls are dropped.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value.as_object()
            .ok_or_else(|| anyhow!("[data::record] Record must be a JSON object, got {value}"))?;

        let geo_code = match obj.get(GEOCODE_COLUMN) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            other => bail!("[data::record] Record is missing a {GEOCODE_COLUMN} (found {other:?})"),
        };

        let year = match obj.get(YEAR_COLUMN) {
            Some(Value::Number(n)) => n.as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .ok_or_else(|| anyhow!("[data::record] {YEAR_COLUMN} {n} is not an integer"))?,
            Some(Value::String(s)) => s.trim().parse::<i64>()
                .map_err(|_| anyhow!("[data::record] {YEAR_COLUMN} {s:?} is not an integer"))?,
            other => bail!("[data::record] Record {geo_code} is missing a {YEAR_COLUMN} (found {other:?})"),
        };
        let year = i32::try_from(year)
            .map_err(|_| anyhow!("[data::record] {YEAR_COLUMN} {year} is out of range"))?;

        let value = match obj.get(VALUE_COLUMN) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => Some(s.trim().parse::<f64>()
                .map_err(|_| anyhow!("[data::record] {VALUE_COLUMN} {s:?} is not a number"))?),
            Some(other) => bail!("[data::record] {VALUE_COLUMN} {other} is not a number"),
        };

        let fields = obj.iter()
            .filter(|(k, _)| !matches!(k.as_str(), GEOCODE_COLUMN | YEAR_COLUMN | VALUE_COLUMN))
            .filter_map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((k.clone(), v))
            })
            .collect();

        Ok(Self { geo_code: geo_code.into(), year, value, fields })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Record;

    #[test]
    fn from_json_reads_core_columns_and_fields() {
        let r = Record::from_json(&json!({
            "GeoCode": "E12000001", "Year": 2015, "Value": 3.5, "Sex": "Female", "Age": 16, "Note": null
        })).unwrap();
        assert_eq!(&*r.geo_code, "E12000001");
        assert_eq!(r.year, 2015);
        assert_eq!(r.value, Some(3.5));
        assert_eq!(r.field("Sex"), Some("Female"));
        assert_eq!(r.field("Age"), Some("16"));
        assert_eq!(r.field("Note"), None);
    }

    #[test]
    fn from_json_accepts_missing_value() {
        let r = Record::from_json(&json!({ "GeoCode": "A", "Year": "2016", "Value": "" })).unwrap();
        assert_eq!(r.year, 2016);
        assert_eq!(r.value, None);
    }

    #[test]
    fn from_json_rejects_bad_rows() {
        assert!(Record::from_json(&json!([1, 2])).is_err());
        assert!(Record::from_json(&json!({ "Year": 2015, "Value": 1 })).is_err());
        assert!(Record::from_json(&json!({ "GeoCode": "A", "Year": 2015.5 })).is_err());
        assert!(Record::from_json(&json!({ "GeoCode": "A", "Year": 2015, "Value": "n/a" })).is_err());
    }
}
