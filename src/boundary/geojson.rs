//! GeoJSON geometry and property parsing.

use anyhow::{Result, anyhow, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value};

/// Features of a FeatureCollection.
pub(crate) fn collection_features(doc: &Value) -> Result<&[Value]> {
    match doc.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        other => bail!("[boundary::geojson] Expected a FeatureCollection, found type {other:?}"),
    }
    doc.get("features")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| anyhow!("[boundary::geojson] FeatureCollection has no features array"))
}

/// Property bag of a feature; a missing or null bag reads as empty.
pub(crate) fn feature_properties(feature: &Value) -> Result<Map<String, Value>> {
    match feature.get("properties") {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(props)) => Ok(props.clone()),
        Some(other) => bail!("[boundary::geojson] Feature properties must be an object, found {other}"),
    }
}

/// Read a string-like property (strings and numbers are accepted).
pub(crate) fn property_text(props: &Map<String, Value>, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a Polygon or MultiPolygon geometry into a MultiPolygon.
pub(crate) fn parse_geometry(geometry: &Value) -> Result<MultiPolygon<f64>> {
    let coords = geometry.get("coordinates")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("[boundary::geojson] Geometry has no coordinates"))?;

    match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => Ok(MultiPolygon(vec![parse_polygon(coords)?])),
        Some("MultiPolygon") => coords.iter()
            .map(|poly| {
                let rings = poly.as_array()
                    .ok_or_else(|| anyhow!("[boundary::geojson] MultiPolygon member must be an array"))?;
                parse_polygon(rings)
            })
            .collect::<Result<Vec<_>>>()
            .map(MultiPolygon),
        other => bail!("[boundary::geojson] Unsupported geometry type {other:?}; expected Polygon or MultiPolygon"),
    }
}

/// Parse polygon rings `[exterior, hole, hole, ...]`.
fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        let ring = ring.as_array()
            .ok_or_else(|| anyhow!("[boundary::geojson] Ring must be an array of positions"))?;
        parse_ring(ring)
    });

    let exterior = rings.next()
        .ok_or_else(|| anyhow!("[boundary::geojson] Polygon has no exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring of `[x, y]` positions, closing it if necessary.
fn parse_ring(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = coords.iter()
        .map(|position| {
            let xy = position.as_array()
                .filter(|p| p.len() >= 2)
                .ok_or_else(|| anyhow!("[boundary::geojson] Position must be an array of at least two numbers"))?;
            let x = xy[0].as_f64().ok_or_else(|| anyhow!("[boundary::geojson] Invalid coordinate: x must be a number"))?;
            let y = xy[1].as_f64().ok_or_else(|| anyhow!("[boundary::geojson] Invalid coordinate: y must be a number"))?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    // Ensure ring is closed (first point == last point)
    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }

    Ok(LineString(points))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{collection_features, parse_geometry, property_text};

    #[test]
    fn polygon_and_multipolygon() {
        let poly = parse_geometry(&json!({
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
                [[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 1.0]]
            ]
        })).unwrap();
        assert_eq!(poly.0.len(), 1);
        assert_eq!(poly.0[0].exterior().0.len(), 5); // closed
        assert_eq!(poly.0[0].interiors().len(), 1);

        let multi = parse_geometry(&json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                [[[5, 5], [6, 5], [6, 6], [5, 5]]]
            ]
        })).unwrap();
        assert_eq!(multi.0.len(), 2);
    }

    #[test]
    fn rejects_other_geometries() {
        assert!(parse_geometry(&json!({ "type": "Point", "coordinates": [0, 0] })).is_err());
        assert!(parse_geometry(&json!({ "type": "Polygon", "coordinates": [] })).is_err());
        assert!(parse_geometry(&json!({ "type": "Polygon", "coordinates": [[[0, "a"]]] })).is_err());
    }

    #[test]
    fn collections_and_properties() {
        assert!(collection_features(&json!({ "type": "Feature" })).is_err());
        let doc = json!({ "type": "FeatureCollection", "features": [{}] });
        assert_eq!(collection_features(&doc).unwrap().len(), 1);

        let props = json!({ "code": "E1", "num": 42, "flag": true });
        let props = props.as_object().unwrap();
        assert_eq!(property_text(props, "code").as_deref(), Some("E1"));
        assert_eq!(property_text(props, "num").as_deref(), Some("42"));
        assert_eq!(property_text(props, "flag"), None);
    }
}
