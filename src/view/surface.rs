//! The rendering seam. The view never draws; it issues commands to a `RenderSurface`.

use geo::Rect;
use serde::Serialize;

use crate::{boundary::FeatureHandle, color::LegendItem, config::FeatureStyle};

/// Name and current value of one feature, for the info box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoContent {
    pub handle: FeatureHandle,
    pub name: String,
    pub value: Option<f64>,
}

/// One row of the multi-select list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionItem {
    pub handle: FeatureHandle,
    pub name: String,
    pub value: Option<f64>,
    /// Position of `value` within the dataset's value range, in `[0, 1]`.
    pub fraction: Option<f64>,
}

/// Content for one of the map's overlay panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "panel", rename_all = "camelCase")]
pub enum Panel {
    Legend { items: Vec<LegendItem> },
    Year { year: i32 },
    /// `None` clears the box back to its prompt.
    Info { content: Option<InfoContent> },
    Selections { items: Vec<SelectionItem> },
}

pub trait RenderSurface {
    /// Current zoom level.
    fn zoom(&self) -> f64;

    /// Apply `style` on top of the feature's current style; unset fields are kept.
    fn set_style(&mut self, handle: FeatureHandle, style: FeatureStyle);

    fn bring_to_front(&mut self, handle: FeatureHandle);

    fn show_layer(&mut self, layer: usize);

    fn hide_layer(&mut self, layer: usize);

    /// Bounds in data coordinates (x = longitude, y = latitude).
    fn fit_bounds(&mut self, bounds: Rect<f64>);

    fn update_panel(&mut self, panel: Panel);

    /// Tick the page filter control for `field`/`value`.
    fn check_filter(&mut self, field: &str, value: &str);
}

/// Serializable record of one surface call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceCommand {
    SetStyle { handle: FeatureHandle, style: FeatureStyle },
    BringToFront { handle: FeatureHandle },
    ShowLayer { layer: usize },
    HideLayer { layer: usize },
    /// `[[south, west], [north, east]]`, the order Leaflet expects.
    FitBounds { bounds: [[f64; 2]; 2] },
    UpdatePanel { panel: Panel },
    CheckFilter { field: String, value: String },
}

/// A surface that records commands instead of drawing them. Used by the
/// bindings (which replay the commands in JavaScript) and by tests.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    zoom: f64,
    commands: Vec<SurfaceCommand>,
}

impl CommandBuffer {
    pub fn new(zoom: f64) -> Self {
        Self { zoom, commands: Vec::new() }
    }

    pub fn set_zoom(&mut self, zoom: f64) { self.zoom = zoom }

    #[inline]
    pub fn commands(&self) -> &[SurfaceCommand] { &self.commands }

    /// Take every recorded command, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Styles applied to `handle`, in order.
    pub fn styles_for(&self, handle: FeatureHandle) -> impl Iterator<Item = &FeatureStyle> {
        self.commands.iter().filter_map(move |c| match c {
            SurfaceCommand::SetStyle { handle: h, style } if *h == handle => Some(style),
            _ => None,
        })
    }

    /// The fill color `handle` would currently show.
    pub fn fill_of(&self, handle: FeatureHandle) -> Option<&str> {
        self.styles_for(handle).filter_map(|s| s.fill_color.as_deref()).last()
    }
}

impl RenderSurface for CommandBuffer {
    fn zoom(&self) -> f64 { self.zoom }

    fn set_style(&mut self, handle: FeatureHandle, style: FeatureStyle) {
        self.commands.push(SurfaceCommand::SetStyle { handle, style });
    }

    fn bring_to_front(&mut self, handle: FeatureHandle) {
        self.commands.push(SurfaceCommand::BringToFront { handle });
    }

    fn show_layer(&mut self, layer: usize) {
        self.commands.push(SurfaceCommand::ShowLayer { layer });
    }

    fn hide_layer(&mut self, layer: usize) {
        self.commands.push(SurfaceCommand::HideLayer { layer });
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>) {
        let (min, max) = (bounds.min(), bounds.max());
        self.commands.push(SurfaceCommand::FitBounds { bounds: [[min.y, min.x], [max.y, max.x]] });
    }

    fn update_panel(&mut self, panel: Panel) {
        self.commands.push(SurfaceCommand::UpdatePanel { panel });
    }

    fn check_filter(&mut self, field: &str, value: &str) {
        self.commands.push(SurfaceCommand::CheckFilter { field: field.to_string(), value: value.to_string() });
    }
}
