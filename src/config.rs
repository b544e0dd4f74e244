//! Widget configuration, read from JSON with the original widget's key names.

use std::{fs, path::Path};

use anyhow::{Context, Result, ensure};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{color::{ColorRange, Rgb}, selection::SelectionPolicy, visibility::ZoomRange};

/// Leaflet path options. Unset fields are left untouched by the surface,
/// so a partial style (e.g. only `fillColor`) can be applied on top of another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
}

impl FeatureStyle {
    pub fn fill(color: Rgb) -> Self {
        Self { fill_color: Some(color.to_string()), ..Default::default() }
    }

    /// `self` with every field set in `over` replaced.
    pub fn merged(&self, over: &FeatureStyle) -> FeatureStyle {
        FeatureStyle {
            weight: over.weight.or(self.weight),
            opacity: over.opacity.or(self.opacity),
            color: over.color.clone().or_else(|| self.color.clone()),
            dash_array: over.dash_array.clone().or_else(|| self.dash_array.clone()),
            fill_color: over.fill_color.clone().or_else(|| self.fill_color.clone()),
            fill_opacity: over.fill_opacity.or(self.fill_opacity),
        }
    }
}

/// One administrative boundary layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    #[serde(rename = "min_zoom")]
    pub min_zoom: f64,
    #[serde(rename = "max_zoom")]
    pub max_zoom: f64,
    pub service_url: String,
    pub id_property: String,
    pub name_property: String,
    /// Record column mirrored into the filter selection when a feature of this layer is clicked.
    #[serde(default)]
    pub csv_dropdown_column: Option<String>,
    #[serde(default)]
    pub style_options: FeatureStyle,
    #[serde(default)]
    pub style_options_selected: FeatureStyle,
}

impl LayerConfig {
    pub fn zoom_range(&self) -> Result<ZoomRange> {
        ZoomRange::new(self.min_zoom, self.max_zoom)
            .with_context(|| format!("[config] Layer {:?} has an invalid zoom range", self.service_url))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
    pub geo_layers: Vec<LayerConfig>,
    pub color_range: ColorRange,
    pub no_value_color: Rgb,
    /// Number of discrete color classes.
    pub legend_items: usize,
    pub selection: SelectionPolicy,
    pub initial_year: Option<i32>,
    /// Only records whose geocode matches are mapped.
    #[serde(rename = "geoCodeRegEx")]
    pub geo_code_regex: Option<String>,
    pub legend_position: String,
    pub slider_position: String,
    pub info_position: String,
    #[serde(rename = "tileURL")]
    pub tile_url: Option<String>,
    pub tile_options: Option<serde_json::Value>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            geo_layers: vec![
                LayerConfig {
                    min_zoom: 0.0,
                    max_zoom: 6.0,
                    service_url: "/sdg-indicators/public/parents.geo.json".into(),
                    id_property: "rgn17cd".into(),
                    name_property: "rgn17nm".into(),
                    csv_dropdown_column: Some("Region".into()),
                    style_options: FeatureStyle {
                        weight: Some(1.0),
                        opacity: Some(1.0),
                        color: Some("#888".into()),
                        dash_array: Some("3".into()),
                        fill_opacity: Some(0.7),
                        ..Default::default()
                    },
                    style_options_selected: FeatureStyle {
                        weight: Some(2.0),
                        color: Some("#555".into()),
                        dash_array: Some("3".into()),
                        ..Default::default()
                    },
                },
                LayerConfig {
                    min_zoom: 7.0,
                    max_zoom: 20.0,
                    service_url: "/sdg-indicators/public/children.geo.json".into(),
                    id_property: "lad16cd".into(),
                    name_property: "lad16nm".into(),
                    csv_dropdown_column: Some("Local authority".into()),
                    style_options: FeatureStyle {
                        weight: Some(1.0),
                        opacity: Some(1.0),
                        color: Some("#AAA".into()),
                        fill_opacity: Some(0.7),
                        ..Default::default()
                    },
                    style_options_selected: FeatureStyle {
                        weight: Some(3.0),
                        color: Some("#222".into()),
                        ..Default::default()
                    },
                },
            ],
            color_range: ColorRange::default(),
            no_value_color: Rgb::new(0xf0, 0xf0, 0xf0),
            legend_items: 5,
            selection: SelectionPolicy::Single,
            initial_year: None,
            geo_code_regex: None,
            legend_position: "bottomright".into(),
            slider_position: "bottomleft".into(),
            info_position: "topright".into(),
            tile_url: None,
            tile_options: None,
        }
    }
}

impl MapConfig {
    /// Parse and validate a JSON configuration. Missing keys take the defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)
            .context("[config] Failed to parse map configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("[config] Invalid configuration in {}", path.display()))
    }

    /// Reject configurations that would otherwise surface later as silently miscolored maps.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.geo_layers.is_empty(), "[config] At least one geo layer is required");
        for (i, layer) in self.geo_layers.iter().enumerate() {
            layer.zoom_range()?;
            ensure!(!layer.id_property.is_empty(), "[config] Layer {i} has an empty idProperty");
            ensure!(!layer.name_property.is_empty(), "[config] Layer {i} has an empty nameProperty");
        }
        ensure!(self.legend_items >= 1, "[config] legendItems must be at least 1");
        self.color_range.stops()?;
        self.geocode_pattern()?;
        Ok(())
    }

    pub fn zoom_ranges(&self) -> Result<Vec<ZoomRange>> {
        self.geo_layers.iter().map(LayerConfig::zoom_range).collect()
    }

    pub fn geocode_pattern(&self) -> Result<Option<Regex>> {
        self.geo_code_regex.as_deref()
            .map(|re| Regex::new(re).with_context(|| format!("[config] Invalid geoCodeRegEx {re:?}")))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureStyle, MapConfig};
    use crate::{color::Rgb, selection::SelectionPolicy};

    #[test]
    fn defaults_match_the_two_level_uk_setup() {
        let config = MapConfig::default();
        config.validate().unwrap();
        assert_eq!(config.geo_layers.len(), 2);
        assert_eq!(config.geo_layers[0].max_zoom, 6.0);
        assert_eq!(config.geo_layers[1].min_zoom, 7.0);
        assert_eq!(config.legend_items, 5);
        assert_eq!(config.no_value_color, Rgb::new(0xf0, 0xf0, 0xf0));
    }

    #[test]
    fn parses_original_key_names() {
        let config = MapConfig::from_json_str(r##"{
            "geoLayers": [{
                "min_zoom": 0, "max_zoom": 20,
                "serviceUrl": "regions.geo.json",
                "idProperty": "code", "nameProperty": "name",
                "styleOptions": { "weight": 1, "fillOpacity": 0.7, "dashArray": "3" }
            }],
            "colorRange": "Blues",
            "noValueColor": "#ccc",
            "legendItems": 7,
            "selection": "multi",
            "geoCodeRegEx": "^E1",
            "tileURL": "https://tiles.example/{z}/{x}/{y}.png"
        }"##).unwrap();
        assert_eq!(config.geo_layers[0].csv_dropdown_column, None);
        assert_eq!(config.geo_layers[0].style_options.dash_array.as_deref(), Some("3"));
        assert_eq!(config.legend_items, 7);
        assert_eq!(config.selection, SelectionPolicy::Multi);
        assert!(config.geocode_pattern().unwrap().unwrap().is_match("E12000001"));
        assert_eq!(config.info_position, "topright");
    }

    #[test]
    fn rejects_bad_setups() {
        assert!(MapConfig::from_json_str(r#"{ "geoLayers": [] }"#).is_err());
        assert!(MapConfig::from_json_str(r#"{ "legendItems": 0 }"#).is_err());
        assert!(MapConfig::from_json_str(r#"{ "noValueColor": "grey" }"#).is_err());
        assert!(MapConfig::from_json_str(r#"{ "geoCodeRegEx": "(" }"#).is_err());
        assert!(MapConfig::from_json_str(r#"{ "geoLayers": [{
            "min_zoom": 9, "max_zoom": 2, "serviceUrl": "x", "idProperty": "id", "nameProperty": "name"
        }] }"#).is_err());
    }

    #[test]
    fn style_merge_and_serialization() {
        let base = FeatureStyle { weight: Some(1.0), color: Some("#888".into()), ..Default::default() };
        let over = FeatureStyle { weight: Some(3.0), ..Default::default() };
        let merged = base.merged(&over);
        assert_eq!(merged.weight, Some(3.0));
        assert_eq!(merged.color.as_deref(), Some("#888"));

        let json = serde_json::to_value(FeatureStyle::fill(Rgb::new(0, 0x44, 0x33))).unwrap();
        assert_eq!(json, serde_json::json!({ "fillColor": "#004433" }));
    }
}
