use std::sync::Arc;

use ahash::AHashMap;
use anyhow::{Result, ensure};
use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{FilterSelection, Record};

/// Minimum and maximum finite value across the loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        ensure!(min.is_finite() && max.is_finite(), "[data::index] Value range [{min}, {max}] must be finite");
        ensure!(min <= max, "[data::index] Value range [{min}, {max}] is inverted");
        Ok(Self { min, max })
    }

    /// Range over all finite values, or None if there are none.
    pub fn of<'a>(records: impl IntoIterator<Item = &'a Record>) -> Option<Self> {
        records.into_iter()
            .filter_map(|r| r.value)
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Self>, v| Some(match acc {
                None => Self { min: v, max: v },
                Some(r) => Self { min: r.min.min(v), max: r.max.max(v) },
            }))
    }

    #[inline]
    pub fn span(&self) -> f64 { self.max - self.min }

    /// Position of `value` within the range in [0, 1]; a degenerate range maps everything to 1.
    pub fn fraction(&self, value: f64) -> f64 {
        if self.span() > 0.0 { ((value - self.min) / self.span()).clamp(0.0, 1.0) } else { 1.0 }
    }
}

/// Point-lookup index over an immutable record set, keyed by geocode then year.
/// Per-key buckets keep insertion order so that the first matching record wins.
#[derive(Debug, Clone)]
pub struct DatasetIndex {
    records: Vec<Record>,
    index: AHashMap<Arc<str>, AHashMap<i32, SmallVec<[u32; 4]>>>,
    years: Vec<i32>,
    range: Option<ValueRange>,
}

impl DatasetIndex {
    pub fn new(records: Vec<Record>) -> Self {
        Self::with_pattern(records, None)
    }

    /// Build the index, keeping only records whose geocode matches `pattern` (if given).
    pub fn with_pattern(records: Vec<Record>, pattern: Option<&Regex>) -> Self {
        let total = records.len();
        let records: Vec<Record> = match pattern {
            Some(re) => records.into_iter().filter(|r| re.is_match(&r.geo_code)).collect(),
            None => records,
        };
        if records.len() < total {
            tracing::debug!("[data::index] {} of {} records excluded by the geocode pattern", total - records.len(), total);
        }

        let mut index: AHashMap<Arc<str>, AHashMap<i32, SmallVec<[u32; 4]>>> = AHashMap::new();
        for (i, record) in records.iter().enumerate() {
            index.entry(record.geo_code.clone())
                .or_default()
                .entry(record.year)
                .or_default()
                .push(i as u32);
        }

        let mut years: Vec<i32> = records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();

        let range = ValueRange::of(&records);

        Self { records, index, years, range }
    }

    /// The first record (in insertion order) for `geo_code` in `year` that satisfies every active filter.
    /// No match is the ordinary "no data" case and yields None.
    pub fn lookup(&self, geo_code: &str, year: i32, filters: &FilterSelection) -> Option<&Record> {
        self.candidates(geo_code, year)
            .find(|r| filters.matches(r))
    }

    /// All records for `geo_code` in `year`, in insertion order, ignoring filters.
    pub fn candidates(&self, geo_code: &str, year: i32) -> impl Iterator<Item = &Record> {
        self.index.get(geo_code)
            .and_then(|by_year| by_year.get(&year))
            .into_iter()
            .flat_map(|bucket| bucket.iter().map(|&i| &self.records[i as usize]))
    }

    /// Whether any record exists for `geo_code`, in any year.
    pub fn contains_geo_code(&self, geo_code: &str) -> bool {
        self.index.contains_key(geo_code)
    }

    /// Sorted, de-duplicated years present in the data.
    #[inline]
    pub fn years(&self) -> &[i32] { &self.years }

    #[inline]
    pub fn value_range(&self) -> Option<ValueRange> { self.range }

    #[inline]
    pub fn records(&self) -> &[Record] { &self.records }

    #[inline]
    pub fn len(&self) -> usize { self.records.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::{DatasetIndex, ValueRange};
    use crate::data::{FieldSelection, FilterSelection, Record};

    fn sample() -> Vec<Record> {
        vec![
            Record::new("E12000001", 2015, Some(10.0)),
            Record::new("E12000001", 2016, Some(12.5)),
            Record::new("E12000002", 2015, Some(7.0)),
            Record::new("E12000002", 2016, None),
            Record::new("E06000001", 2015, Some(3.0)).with_field("Sex", "Female"),
            Record::new("E06000001", 2015, Some(4.0)).with_field("Sex", "Male"),
            Record::new("K02000001", 2014, Some(100.0)),
        ]
    }

    #[test]
    fn every_record_is_found_by_its_own_key() {
        let records = sample();
        let index = DatasetIndex::new(records.clone());
        for r in &records {
            let hit = index.lookup(&r.geo_code, r.year, &FilterSelection::none())
                .expect("record should be found");
            // Duplicated keys resolve to the first record, so compare against that.
            let first = records.iter().find(|x| x.geo_code == r.geo_code && x.year == r.year).unwrap();
            assert_eq!(hit.value, first.value);
        }
    }

    #[test]
    fn missing_key_is_no_data() {
        let index = DatasetIndex::new(sample());
        assert!(index.lookup("E12000001", 2030, &FilterSelection::none()).is_none());
        assert!(index.lookup("nowhere", 2015, &FilterSelection::none()).is_none());
    }

    #[test]
    fn first_match_wins_on_duplicates() {
        let index = DatasetIndex::new(vec![
            Record::new("A", 2015, Some(1.0)),
            Record::new("A", 2015, Some(2.0)),
        ]);
        assert_eq!(index.lookup("A", 2015, &FilterSelection::none()).unwrap().value, Some(1.0));
        assert_eq!(index.candidates("A", 2015).count(), 2);
    }

    #[test]
    fn filters_select_disaggregated_rows() {
        let index = DatasetIndex::new(sample());
        let male = FilterSelection::from(vec![FieldSelection::new("Sex", ["Male"])]);
        assert_eq!(index.lookup("E06000001", 2015, &male).unwrap().value, Some(4.0));

        // Rows without the filtered field do not match an active filter.
        assert!(index.lookup("E12000001", 2015, &male).is_none());

        // Unfiltered lookups fall back to insertion order.
        assert_eq!(index.lookup("E06000001", 2015, &FilterSelection::none()).unwrap().value, Some(3.0));
    }

    #[test]
    fn years_and_range() {
        let index = DatasetIndex::new(sample());
        assert_eq!(index.years(), &[2014, 2015, 2016]);
        assert_eq!(index.value_range(), Some(ValueRange { min: 3.0, max: 100.0 }));
        assert!(DatasetIndex::new(vec![Record::new("A", 2015, None)]).value_range().is_none());
    }

    #[test]
    fn geocode_pattern_excludes_aggregates() {
        let re = Regex::new("^E").unwrap();
        let index = DatasetIndex::with_pattern(sample(), Some(&re));
        assert!(!index.contains_geo_code("K02000001"));
        assert_eq!(index.years(), &[2015, 2016]);
        assert_eq!(index.value_range().unwrap().max, 12.5);
    }

    #[test]
    fn range_fraction() {
        let r = ValueRange::new(10.0, 20.0).unwrap();
        assert_eq!(r.fraction(15.0), 0.5);
        assert_eq!(r.fraction(0.0), 0.0);
        assert_eq!(r.fraction(99.0), 1.0);
        assert_eq!(ValueRange::new(5.0, 5.0).unwrap().fraction(5.0), 1.0);
        assert!(ValueRange::new(2.0, 1.0).is_err());
    }
}
