use serde_json::Value;
use wasm_bindgen::{JsValue, prelude::wasm_bindgen};

use sdgmap_core::{
    CommandBuffer, FeatureHandle, FilterSelection, MapConfig, MapView, Record, UiEvent,
    read_records_csv_str, records_from_json, render_svg_string, write_feature_table_string,
};

use crate::common::*;

/// A map view driven from JavaScript. Every event method takes the map's
/// current zoom and returns the surface commands to apply, in order.
#[wasm_bindgen]
pub struct WasmMapView {
    inner: MapView,
    surface: CommandBuffer,
}

impl WasmMapView {
    fn build(config: JsValue, records: Vec<Record>, boundaries: JsValue) -> Result<WasmMapView, JsValue> {
        let config: MapConfig = from_js(config, "map configuration")?;
        config.validate().map_err(js_err)?;
        let docs: Vec<Value> = from_js(boundaries, "boundary documents")?;
        let inner = MapView::new(config, records, &docs).map_err(js_err)?;
        Ok(WasmMapView { inner, surface: CommandBuffer::default() })
    }

    fn dispatch(&mut self, event: UiEvent, zoom: f64) -> Result<JsValue, JsValue> {
        self.surface.set_zoom(zoom);
        self.inner.dispatch(event, &mut self.surface).map_err(js_err)?;
        to_js(&self.surface.drain())
    }
}

#[wasm_bindgen]
impl WasmMapView {
    /// config: map configuration object; records: array of row objects;
    /// boundaries: one parsed GeoJSON FeatureCollection per configured layer.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, records: JsValue, boundaries: JsValue) -> Result<WasmMapView, JsValue> {
        let rows: Value = from_js(records, "records")?;
        let records = records_from_json(&rows).map_err(js_err)?;
        Self::build(config, records, boundaries)
    }

    /// Same as the constructor, with records given as CSV text.
    pub fn from_csv(config: JsValue, csv: &str, boundaries: JsValue) -> Result<WasmMapView, JsValue> {
        let records = read_records_csv_str(csv).map_err(js_err)?;
        Self::build(config, records, boundaries)
    }

    /// First render: base styles, fills, visible layers and panels.
    pub fn attach(&mut self, zoom: f64) -> Result<JsValue, JsValue> {
        self.surface.set_zoom(zoom);
        self.inner.attach(&mut self.surface).map_err(js_err)?;
        to_js(&self.surface.drain())
    }

    pub fn click(&mut self, handle: u32, zoom: f64) -> Result<JsValue, JsValue> {
        self.dispatch(UiEvent::Click(FeatureHandle(handle)), zoom)
    }

    pub fn zoom_end(&mut self, zoom: f64) -> Result<JsValue, JsValue> {
        self.dispatch(UiEvent::ZoomEnd, zoom)
    }

    pub fn set_year_index(&mut self, index: usize, zoom: f64) -> Result<JsValue, JsValue> {
        self.dispatch(UiEvent::YearInput(index), zoom)
    }

    pub fn step_year(&mut self, zoom: f64) -> Result<JsValue, JsValue> {
        self.dispatch(UiEvent::StepYear, zoom)
    }

    /// filters: [{ field, values: [...] }, ...]
    pub fn update_filters(&mut self, filters: JsValue, zoom: f64) -> Result<JsValue, JsValue> {
        let filters: FilterSelection = from_js(filters, "filters")?;
        self.dispatch(UiEvent::UpdateFilters(filters), zoom)
    }

    pub fn resize(&mut self, zoom: f64) -> Result<JsValue, JsValue> {
        self.dispatch(UiEvent::Resize, zoom)
    }

    /// Years with data, ascending (the slider's positions).
    pub fn years(&self) -> Vec<i32> {
        self.inner.years().to_vec()
    }

    pub fn current_year(&self) -> i32 {
        self.inner.current_year()
    }

    /// Feature handles of `layer`, in document order, so the page can map them to its Leaflet layers.
    pub fn handles(&self, layer: usize) -> Result<Vec<u32>, JsValue> {
        let layer = self.inner.state().boundaries().layer(layer)
            .ok_or_else(|| js_err(format!("No layer {layer}")))?;
        Ok(layer.features().iter().map(|f| f.handle.0).collect())
    }

    /// Handle of the feature of `layer` under (lon, lat), if any.
    pub fn feature_at(&self, layer: usize, lon: f64, lat: f64) -> Option<u32> {
        self.inner.state().boundaries().layer(layer)?
            .feature_at(lon, lat)
            .map(|f| f.handle.0)
    }

    /// SVG snapshot of `layers` (empty: the visible ones).
    pub fn to_svg(&self, layers: Vec<usize>) -> Result<String, JsValue> {
        render_svg_string(self.inner.state(), &layers).map_err(js_err)
    }

    /// CSV of every feature's current value and color.
    pub fn to_csv(&self, layers: Vec<usize>) -> Result<String, JsValue> {
        write_feature_table_string(self.inner.state(), &layers).map_err(js_err)
    }
}
