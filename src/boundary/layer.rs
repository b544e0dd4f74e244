use std::{fmt, sync::Arc};

use ahash::AHashMap;
use anyhow::{Context, Result, anyhow, ensure};
use geo::{BoundingRect, Intersects, MultiPolygon, Point, Rect};
use rstar::{RTree, primitives::{GeomWithData, Rectangle}};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::geojson::{collection_features, feature_properties, parse_geometry, property_text};
use crate::config::LayerConfig;

/// Stable per-feature identity, assigned sequentially (layer by layer, in document order)
/// when the boundary set is built. Two features are the same iff their handles match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureHandle(pub u32);

impl fmt::Display for FeatureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// One region's polygon plus its property bag.
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    pub handle: FeatureHandle,
    pub layer: usize,
    pub geo_code: Arc<str>,
    pub name: String,
    pub properties: Map<String, Value>,
    pub geometry: MultiPolygon<f64>,
    pub bounds: Option<Rect<f64>>,
}

type BoxEntry = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// All features of one administrative level.
#[derive(Debug)]
pub struct BoundaryLayer {
    pub index: usize,
    pub config: LayerConfig,
    features: Vec<BoundaryFeature>,
    by_code: AHashMap<Arc<str>, usize>,
    tree: RTree<BoxEntry>,
    bounds: Option<Rect<f64>>,
}

impl BoundaryLayer {
    fn from_collection(index: usize, config: &LayerConfig, doc: &Value, next_handle: &mut u32) -> Result<Self> {
        let raw = collection_features(doc)
            .with_context(|| format!("[boundary] Layer {index} ({})", config.service_url))?;

        let mut features = Vec::with_capacity(raw.len());
        for (i, feature) in raw.iter().enumerate() {
            let props = feature_properties(feature)
                .with_context(|| format!("[boundary] Layer {index}, feature {i}"))?;
            let geo_code = property_text(&props, &config.id_property)
                .ok_or_else(|| anyhow!("[boundary] Layer {index}, feature {i}: idProperty {:?} is missing", config.id_property))?;
            let name = property_text(&props, &config.name_property)
                .ok_or_else(|| anyhow!("[boundary] Layer {index}, feature {i}: nameProperty {:?} is missing", config.name_property))?;
            let geometry = feature.get("geometry")
                .filter(|g| !g.is_null())
                .ok_or_else(|| anyhow!("[boundary] Layer {index}, feature {i} ({geo_code}) has no geometry"))
                .and_then(parse_geometry)
                .with_context(|| format!("[boundary] Layer {index}, feature {i} ({geo_code})"))?;

            let bounds = geometry.bounding_rect();
            features.push(BoundaryFeature {
                handle: FeatureHandle(*next_handle),
                layer: index,
                geo_code: geo_code.into(),
                name,
                properties: props,
                geometry,
                bounds,
            });
            *next_handle += 1;
        }

        let mut by_code = AHashMap::with_capacity(features.len());
        for (i, f) in features.iter().enumerate() {
            if by_code.contains_key(&f.geo_code) {
                tracing::warn!("[boundary] Layer {index}: duplicate id {} (feature {i}); lookups keep the first", f.geo_code);
                continue;
            }
            by_code.insert(f.geo_code.clone(), i);
        }

        let tree = RTree::bulk_load(features.iter().enumerate()
            .filter_map(|(i, f)| f.bounds.map(|b| {
                let rect = Rectangle::from_corners([b.min().x, b.min().y], [b.max().x, b.max().y]);
                GeomWithData::new(rect, i)
            }))
            .collect());

        let bounds = union_bounds(features.iter().filter_map(|f| f.bounds));

        Ok(Self { index, config: config.clone(), features, by_code, tree, bounds })
    }

    #[inline]
    pub fn features(&self) -> &[BoundaryFeature] { &self.features }

    #[inline]
    pub fn len(&self) -> usize { self.features.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.features.is_empty() }

    #[inline]
    pub fn bounds(&self) -> Option<Rect<f64>> { self.bounds }

    /// Feature with the given geocode (first one if the layer repeats it).
    pub fn feature_by_code(&self, geo_code: &str) -> Option<&BoundaryFeature> {
        self.by_code.get(geo_code).map(|&i| &self.features[i])
    }

    /// Feature whose polygon contains (or touches) the point `(x, y)`, in document order.
    pub fn feature_at(&self, x: f64, y: f64) -> Option<&BoundaryFeature> {
        let point = Point::new(x, y);
        let mut hits: Vec<usize> = self.tree.locate_all_at_point(&[x, y])
            .map(|entry| entry.data)
            .filter(|&i| self.features[i].geometry.intersects(&point))
            .collect();
        hits.sort_unstable();
        hits.first().map(|&i| &self.features[i])
    }
}

/// Smallest rectangle covering all `rects`.
pub(crate) fn union_bounds(rects: impl IntoIterator<Item = Rect<f64>>) -> Option<Rect<f64>> {
    rects.into_iter().reduce(|a, b| Rect::new(
        (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
        (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
    ))
}

/// Every configured layer, built from one FeatureCollection per layer.
#[derive(Debug)]
pub struct Boundaries {
    layers: Vec<BoundaryLayer>,
    handles: Vec<(usize, usize)>, // handle -> (layer, feature index)
}

impl Boundaries {
    /// Build layers from `docs`, which must line up one-to-one with `configs`.
    /// Any feature lacking its configured id or name property fails the whole build.
    pub fn from_collections(configs: &[LayerConfig], docs: &[Value]) -> Result<Self> {
        ensure!(configs.len() == docs.len(),
            "[boundary] {} layers configured but {} boundary documents supplied",
            configs.len(),
            docs.len(),
        );

        let mut next_handle = 0u32;
        let layers = configs.iter().zip(docs).enumerate()
            .map(|(i, (config, doc))| BoundaryLayer::from_collection(i, config, doc, &mut next_handle))
            .collect::<Result<Vec<_>>>()?;

        let handles = layers.iter()
            .flat_map(|layer| (0..layer.len()).map(move |i| (layer.index, i)))
            .collect();

        tracing::info!("[boundary] Loaded {} layers with {} features",
            layers.len(),
            layers.iter().map(BoundaryLayer::len).sum::<usize>(),
        );

        Ok(Self { layers, handles })
    }

    #[inline]
    pub fn layers(&self) -> &[BoundaryLayer] { &self.layers }

    #[inline]
    pub fn layer(&self, index: usize) -> Option<&BoundaryLayer> { self.layers.get(index) }

    pub fn feature(&self, handle: FeatureHandle) -> Option<&BoundaryFeature> {
        let &(layer, i) = self.handles.get(handle.0 as usize)?;
        Some(&self.layers[layer].features[i])
    }

    /// Layer holding `handle`.
    pub fn layer_of(&self, handle: FeatureHandle) -> Option<usize> {
        self.handles.get(handle.0 as usize).map(|&(layer, _)| layer)
    }

    /// Every feature of every layer, in handle order.
    pub fn features(&self) -> impl Iterator<Item = &BoundaryFeature> {
        self.layers.iter().flat_map(|layer| layer.features.iter())
    }

    /// Total number of features (and therefore of handles).
    #[inline]
    pub fn len(&self) -> usize { self.handles.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.handles.is_empty() }

    /// Bounds covering the given layers.
    pub fn bounds_of(&self, layers: impl IntoIterator<Item = usize>) -> Option<Rect<f64>> {
        union_bounds(layers.into_iter().filter_map(|i| self.layer(i)?.bounds()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::{Value, json};

    use super::{Boundaries, FeatureHandle};
    use crate::config::LayerConfig;

    pub(crate) fn layer_config(min_zoom: f64, max_zoom: f64, dropdown: Option<&str>) -> LayerConfig {
        LayerConfig {
            min_zoom,
            max_zoom,
            service_url: format!("layer-{min_zoom}.geo.json"),
            id_property: "code".into(),
            name_property: "name".into(),
            csv_dropdown_column: dropdown.map(Into::into),
            style_options: Default::default(),
            style_options_selected: Default::default(),
        }
    }

    /// Unit square at `(x, y)` with the given code and name.
    pub(crate) fn square(code: &str, name: &str, x: f64, y: f64) -> Value {
        json!({
            "type": "Feature",
            "properties": { "code": code, "name": name },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[x, y], [x + 1.0, y], [x + 1.0, y + 1.0], [x, y + 1.0], [x, y]]]
            }
        })
    }

    pub(crate) fn collection(features: Vec<Value>) -> Value {
        json!({ "type": "FeatureCollection", "features": features })
    }

    #[test]
    fn handles_are_sequential_across_layers() {
        let b = Boundaries::from_collections(
            &[layer_config(0.0, 6.0, None), layer_config(7.0, 20.0, None)],
            &[
                collection(vec![square("R1", "North", 0.0, 0.0), square("R2", "South", 0.0, -1.0)]),
                collection(vec![square("L1", "Town", 0.0, 0.0)]),
            ],
        ).unwrap();

        assert_eq!(b.len(), 3);
        assert_eq!(&*b.feature(FeatureHandle(0)).unwrap().geo_code, "R1");
        assert_eq!(&*b.feature(FeatureHandle(2)).unwrap().geo_code, "L1");
        assert_eq!(b.layer_of(FeatureHandle(2)), Some(1));
        assert!(b.feature(FeatureHandle(3)).is_none());
        assert_eq!(b.features().map(|f| f.handle.0).collect::<Vec<_>>(), vec![0, 1, 2]);

        let bounds = b.bounds_of([0]).unwrap();
        assert_eq!((bounds.min().y, bounds.max().y), (-1.0, 1.0));
    }

    #[test]
    fn missing_id_property_fails_setup() {
        let mut bad = square("R1", "North", 0.0, 0.0);
        bad["properties"].as_object_mut().unwrap().remove("code");
        let err = Boundaries::from_collections(&[layer_config(0.0, 20.0, None)], &[collection(vec![bad])]).unwrap_err();
        assert!(format!("{err:#}").contains("idProperty"));

        let mut nameless = square("R1", "North", 0.0, 0.0);
        nameless["properties"].as_object_mut().unwrap().remove("name");
        assert!(Boundaries::from_collections(&[layer_config(0.0, 20.0, None)], &[collection(vec![nameless])]).is_err());
    }

    #[test]
    fn layer_and_document_counts_must_match() {
        assert!(Boundaries::from_collections(&[layer_config(0.0, 20.0, None)], &[]).is_err());
    }

    #[test]
    fn null_geometry_fails_setup() {
        let mut f = square("R1", "North", 0.0, 0.0);
        f["geometry"] = Value::Null;
        assert!(Boundaries::from_collections(&[layer_config(0.0, 20.0, None)], &[collection(vec![f])]).is_err());
    }

    #[test]
    fn point_picking() {
        let b = Boundaries::from_collections(
            &[layer_config(0.0, 20.0, None)],
            &[collection(vec![square("A", "Left", 0.0, 0.0), square("B", "Right", 2.0, 0.0)])],
        ).unwrap();
        let layer = b.layer(0).unwrap();
        assert_eq!(&*layer.feature_at(0.5, 0.5).unwrap().geo_code, "A");
        assert_eq!(&*layer.feature_at(2.5, 0.5).unwrap().geo_code, "B");
        assert!(layer.feature_at(1.5, 0.5).is_none());
        assert_eq!(layer.feature_by_code("B").unwrap().name, "Right");
    }
}
