use serde::{Deserialize, Serialize};

use super::Record;

/// One active disaggregation filter: `field` must equal one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelection {
    pub field: String,
    pub values: Vec<String>,
}

impl FieldSelection {
    pub fn new(field: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { field: field.into(), values: values.into_iter().map(Into::into).collect() }
    }

    /// An empty value list constrains nothing.
    #[inline]
    pub fn is_active(&self) -> bool { !self.values.is_empty() }

    /// Whether `record` satisfies this constraint. Records lacking the field never match an active filter.
    pub fn matches(&self, record: &Record) -> bool {
        if !self.is_active() { return true }
        record.field(&self.field)
            .is_some_and(|v| self.values.iter().any(|wanted| wanted == v))
    }
}

/// Ordered list of currently active filters, applied conjunctively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSelection(pub Vec<FieldSelection>);

impl FilterSelection {
    pub fn none() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool { self.0.iter().all(|f| !f.is_active()) }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSelection> { self.0.iter() }

    pub fn matches(&self, record: &Record) -> bool {
        self.0.iter().all(|f| f.matches(record))
    }
}

impl From<Vec<FieldSelection>> for FilterSelection {
    fn from(fields: Vec<FieldSelection>) -> Self { Self(fields) }
}

#[cfg(test)]
mod tests {
    use super::{FieldSelection, FilterSelection};
    use crate::data::Record;

    #[test]
    fn membership_and_missing_fields() {
        let female = Record::new("A", 2015, Some(1.0)).with_field("Sex", "Female");
        let total = Record::new("A", 2015, Some(2.0));

        let f = FieldSelection::new("Sex", ["Female", "Male"]);
        assert!(f.matches(&female));
        assert!(!f.matches(&total));

        let empty = FieldSelection::new("Sex", Vec::<String>::new());
        assert!(!empty.is_active());
        assert!(empty.matches(&total));
    }

    #[test]
    fn filters_are_conjunctive() {
        let r = Record::new("A", 2015, Some(1.0)).with_field("Sex", "Female").with_field("Age", "16-24");
        let both = FilterSelection::from(vec![
            FieldSelection::new("Sex", ["Female"]),
            FieldSelection::new("Age", ["25-34"]),
        ]);
        assert!(!both.matches(&r));
        assert!(FilterSelection::none().matches(&r));
        assert!(FilterSelection::none().is_empty());
    }
}
