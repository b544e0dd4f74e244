use geo::{Coord, CoordsIter, LineString, MultiPolygon, Rect};

/// lon/lat -> SVG coords, preserving aspect with Y pointing down.
#[derive(Debug, Clone, Copy)]
pub(super) struct Projection {
    bounds: Rect<f64>,
    margin: f64,
    pub(super) scale: f64,
}

impl Projection {
    /// Fit `bounds` into `width` pixels minus a margin on each side.
    /// Returns the projection and the resulting map height (margins included).
    pub(super) fn fit(bounds: Rect<f64>, width: f64, margin: f64) -> (Self, f64) {
        let span = if bounds.width() > 0.0 { bounds.width() } else { bounds.height().max(1.0) };
        let scale = (width - 2.0 * margin) / span;
        let height = bounds.height() * scale + 2.0 * margin;
        (Self { bounds, margin, scale }, height)
    }

    pub(super) fn project(&self, coord: &Coord<f64>) -> (f64, f64) {
        let x = self.margin + (coord.x - self.bounds.min().x) * self.scale;
        let y = self.margin + (self.bounds.max().y - coord.y) * self.scale;
        (x, y)
    }

    /// Compact SVG path for a MultiPolygon, exteriors and holes (draw with `fill-rule="evenodd"`).
    pub(super) fn multipolygon_to_path(&self, shape: &MultiPolygon<f64>) -> String {
        let mut out = String::new();
        for polygon in &shape.0 {
            self.ring_to_path(polygon.exterior(), &mut out);
            for interior in polygon.interiors() {
                self.ring_to_path(interior, &mut out);
            }
        }
        out
    }

    /// Append a ring as an SVG subpath: "M x,y L x,y ... Z"
    fn ring_to_path(&self, ring: &LineString<f64>, out: &mut String) {
        let mut coords = ring.coords_iter().map(|coord| self.project(&coord));
        if let Some((x, y)) = coords.next() {
            out.push_str(&format!(" M{x:.3},{y:.3}"));
            for (x, y) in coords {
                out.push_str(&format!(" L{x:.3},{y:.3}"));
            }
            out.push('Z');
        }
    }
}
