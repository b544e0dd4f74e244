//! Zoom-driven layer visibility.

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Inclusive zoom interval in which a layer is shown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl ZoomRange {
    pub fn new(min_zoom: f64, max_zoom: f64) -> Result<Self> {
        ensure!(min_zoom <= max_zoom, "[visibility] Zoom range [{min_zoom}, {max_zoom}] is inverted");
        Ok(Self { min_zoom, max_zoom })
    }

    #[inline]
    pub fn contains(&self, zoom: f64) -> bool {
        self.min_zoom <= zoom && zoom <= self.max_zoom
    }
}

/// Layers that changed state on a zoom update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisibilityChange {
    pub shown: Vec<usize>,
    pub hidden: Vec<usize>,
}

impl VisibilityChange {
    pub fn is_empty(&self) -> bool { self.shown.is_empty() && self.hidden.is_empty() }
}

/// Tracks which layers are on the render surface for the current zoom.
/// Ranges are not required to be disjoint: overlapping layers are shown together,
/// and a zoom that falls in a gap shows nothing.
#[derive(Debug, Clone)]
pub struct VisibilityController {
    ranges: Vec<ZoomRange>,
    visible: Vec<bool>,
}

impl VisibilityController {
    /// All layers start hidden until the first `update`.
    pub fn new(ranges: Vec<ZoomRange>) -> Self {
        let visible = vec![false; ranges.len()];
        Self { ranges, visible }
    }

    /// Recompute visibility for `zoom` and report transitions, in layer order.
    pub fn update(&mut self, zoom: f64) -> VisibilityChange {
        let mut change = VisibilityChange::default();
        for (layer, (range, visible)) in self.ranges.iter().zip(self.visible.iter_mut()).enumerate() {
            let now = range.contains(zoom);
            if now != *visible {
                if now { change.shown.push(layer) } else { change.hidden.push(layer) }
                *visible = now;
            }
        }
        change
    }

    #[inline]
    pub fn is_visible(&self, layer: usize) -> bool {
        self.visible.get(layer).copied().unwrap_or(false)
    }

    pub fn visible_layers(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible.iter().enumerate().filter(|(_, v)| **v).map(|(i, _)| i)
    }

    /// Layers that would be visible at `zoom`, without changing state.
    pub fn layers_at(&self, zoom: f64) -> Vec<usize> {
        self.ranges.iter().enumerate()
            .filter(|(_, r)| r.contains(zoom))
            .map(|(i, _)| i)
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize { self.ranges.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.ranges.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::{VisibilityChange, VisibilityController, ZoomRange};

    fn controller(ranges: &[(f64, f64)]) -> VisibilityController {
        VisibilityController::new(ranges.iter().map(|&(a, b)| ZoomRange::new(a, b).unwrap()).collect())
    }

    #[test]
    fn switch_point_is_exclusive() {
        let mut vc = controller(&[(0.0, 6.0), (7.0, 20.0)]);

        assert_eq!(vc.update(6.0), VisibilityChange { shown: vec![0], hidden: vec![] });
        assert!(vc.is_visible(0));
        assert!(!vc.is_visible(1));

        assert_eq!(vc.update(7.0), VisibilityChange { shown: vec![1], hidden: vec![0] });
        assert!(!vc.is_visible(0));
        assert!(vc.is_visible(1));
    }

    #[test]
    fn repeated_zoom_reports_nothing() {
        let mut vc = controller(&[(0.0, 6.0), (7.0, 20.0)]);
        vc.update(3.0);
        assert!(vc.update(4.0).is_empty());
        assert_eq!(vc.visible_layers().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn gap_shows_nothing() {
        let mut vc = controller(&[(0.0, 6.0), (7.0, 20.0)]);
        vc.update(6.0);
        assert_eq!(vc.update(6.5), VisibilityChange { shown: vec![], hidden: vec![0] });
        assert_eq!(vc.visible_layers().count(), 0);
        assert!(vc.layers_at(21.0).is_empty());
    }

    #[test]
    fn overlap_shows_both() {
        let mut vc = controller(&[(0.0, 8.0), (6.0, 20.0)]);
        assert_eq!(vc.update(7.0).shown, vec![0, 1]);
        assert_eq!(vc.layers_at(7.0), vec![0, 1]);
        assert_eq!(vc.update(9.0).hidden, vec![0]);
    }

    #[test]
    fn inverted_range_rejected() {
        assert!(ZoomRange::new(7.0, 6.0).is_err());
        assert!(!controller(&[]).is_visible(3));
    }
}
