use anyhow::{Result, anyhow};
use serde_json::Value;

use super::surface::{InfoContent, SelectionItem};
use crate::{
    boundary::{Boundaries, BoundaryFeature, FeatureHandle},
    color::{ColorScale, Rgb},
    config::MapConfig,
    data::{DatasetIndex, FieldSelection, FilterSelection, Record},
    selection::Selection,
    visibility::VisibilityController,
};

/// Everything the map shows, owned in one place. Mutated only by `MapView`;
/// subscribers get shared access after each event.
#[derive(Debug)]
pub struct ViewState {
    pub(super) config: MapConfig,
    pub(super) boundaries: Boundaries,
    pub(super) dataset: DatasetIndex,
    pub(super) scale: ColorScale,
    pub(super) selection: Selection,
    pub(super) visibility: VisibilityController,
    pub(super) year_index: usize,
    pub(super) filters: FilterSelection,
}

impl ViewState {
    /// Build the state from a validated configuration, indicator records and one
    /// boundary FeatureCollection per configured layer.
    pub fn new(config: MapConfig, records: Vec<Record>, docs: &[Value]) -> Result<Self> {
        config.validate()?;
        let boundaries = Boundaries::from_collections(&config.geo_layers, docs)?;
        let dataset = DatasetIndex::with_pattern(records, config.geocode_pattern()?.as_ref());

        let range = dataset.value_range()
            .ok_or_else(|| anyhow!("[view] Dataset has no numeric values to build a color scale from"))?;
        let scale = ColorScale::new(&config.color_range, range, config.legend_items, config.no_value_color)?;

        let year_index = match config.initial_year {
            Some(year) => dataset.years().iter().position(|&y| y == year)
                .ok_or_else(|| anyhow!("[view] initialYear {year} is not in the dataset (years: {:?})", dataset.years()))?,
            None => 0,
        };

        for layer in boundaries.layers() {
            let matched = layer.features().iter().filter(|f| dataset.contains_geo_code(&f.geo_code)).count();
            if matched == 0 && !layer.is_empty() {
                tracing::warn!("[view] Layer {} ({}) has no features with data", layer.index, layer.config.service_url);
            } else {
                tracing::debug!("[view] Layer {}: {matched}/{} features have data", layer.index, layer.len());
            }
        }

        let visibility = VisibilityController::new(config.zoom_ranges()?);
        let selection = Selection::new(config.selection);

        Ok(Self {
            config,
            boundaries,
            dataset,
            scale,
            selection,
            visibility,
            year_index,
            filters: FilterSelection::none(),
        })
    }

    #[inline] pub fn config(&self) -> &MapConfig { &self.config }
    #[inline] pub fn boundaries(&self) -> &Boundaries { &self.boundaries }
    #[inline] pub fn dataset(&self) -> &DatasetIndex { &self.dataset }
    #[inline] pub fn scale(&self) -> &ColorScale { &self.scale }
    #[inline] pub fn selection(&self) -> &Selection { &self.selection }
    #[inline] pub fn visibility(&self) -> &VisibilityController { &self.visibility }
    #[inline] pub fn filters(&self) -> &FilterSelection { &self.filters }

    /// Years with data, ascending.
    #[inline]
    pub fn years(&self) -> &[i32] { self.dataset.years() }

    #[inline]
    pub fn year_index(&self) -> usize { self.year_index }

    pub fn current_year(&self) -> i32 {
        self.years()[self.year_index]
    }

    pub fn feature(&self, handle: FeatureHandle) -> Option<&BoundaryFeature> {
        self.boundaries.feature(handle)
    }

    /// Record shown for `handle` under the current year and filters.
    pub fn record_of(&self, handle: FeatureHandle) -> Option<&Record> {
        let feature = self.feature(handle)?;
        self.dataset.lookup(&feature.geo_code, self.current_year(), &self.filters)
    }

    pub fn value_of(&self, handle: FeatureHandle) -> Option<f64> {
        self.record_of(handle).and_then(|r| r.value)
    }

    /// Fill color for `handle`; the no-data color when nothing matches.
    pub fn color_of(&self, handle: FeatureHandle) -> Rgb {
        self.scale.color_for(self.value_of(handle))
    }

    pub fn info(&self, handle: FeatureHandle) -> Option<InfoContent> {
        let feature = self.feature(handle)?;
        Some(InfoContent { handle, name: feature.name.clone(), value: self.value_of(handle) })
    }

    pub fn selection_item(&self, handle: FeatureHandle) -> Option<SelectionItem> {
        let feature = self.feature(handle)?;
        let value = self.value_of(handle);
        Some(SelectionItem {
            handle,
            name: feature.name.clone(),
            value,
            fraction: value.map(|v| self.scale.range().fraction(v)),
        })
    }

    /// Filters implied by the current selection in `layer`: the selected features'
    /// values of the layer's dropdown column. `None` if the layer has no such column.
    pub(super) fn derived_filters(&self, layer: usize) -> Option<FilterSelection> {
        let column = self.boundaries.layer(layer)?.config.csv_dropdown_column.as_deref()?;
        let mut values: Vec<String> = Vec::new();
        for &handle in self.selection.selected() {
            let Some(feature) = self.feature(handle).filter(|f| f.layer == layer) else { continue };
            let value = self.dropdown_value(feature, column);
            if !values.contains(&value) {
                values.push(value);
            }
        }
        if values.is_empty() {
            return Some(FilterSelection::none());
        }
        Some(FilterSelection(vec![FieldSelection { field: column.to_string(), values }]))
    }

    /// The feature's value of `column` in any record for the current year, ignoring
    /// filters; falls back to the feature name.
    fn dropdown_value(&self, feature: &BoundaryFeature, column: &str) -> String {
        self.dataset.candidates(&feature.geo_code, self.current_year())
            .find_map(|r| r.field(column))
            .map(str::to_string)
            .unwrap_or_else(|| feature.name.clone())
    }
}
