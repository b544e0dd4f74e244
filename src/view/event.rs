use crate::{boundary::FeatureHandle, data::FilterSelection, selection::SelectionEvent, visibility::VisibilityChange};

/// User interactions the view reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Click or touch on a feature.
    Click(FeatureHandle),
    /// The surface finished zooming; the new level is read from the surface.
    ZoomEnd,
    /// Year slider moved to position `index` (into the sorted year list).
    YearInput(usize),
    /// Player control: advance to the next year, wrapping around.
    StepYear,
    /// The page's disaggregation filters changed.
    UpdateFilters(FilterSelection),
    /// The map container was shown or resized; refit to the visible layers.
    Resize,
}

/// Everything one event (or the initial attach) changed. Subscribers read this
/// together with the current state; none of them see intermediate states.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateChange {
    /// First render after attaching to a surface.
    pub initial: bool,
    pub selection: Vec<SelectionEvent>,
    pub year_changed: bool,
    pub filters_changed: bool,
    pub visibility: VisibilityChange,
    /// Zoom the surface to this feature.
    pub focus: Option<FeatureHandle>,
    /// Refit the surface to the visible layers.
    pub refit: bool,
    /// Filters derived from a click, to be mirrored by the page's filter controls.
    pub synced_filters: Option<FilterSelection>,
}

impl StateChange {
    /// Whether feature fill colors need recomputing.
    #[inline]
    pub fn recolor(&self) -> bool {
        self.initial || self.year_changed || self.filters_changed
    }

    pub fn is_empty(&self) -> bool {
        *self == StateChange::default()
    }
}
