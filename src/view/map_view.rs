use anyhow::{Result, anyhow, bail, ensure};
use serde_json::Value;

use super::{
    event::{StateChange, UiEvent},
    state::ViewState,
    subscribers::{Subscriber, default_subscribers},
    surface::{InfoContent, RenderSurface},
};
use crate::{
    boundary::{Fetch, FeatureHandle, load_all},
    color::Rgb,
    config::MapConfig,
    data::{FilterSelection, Record},
    selection::SelectionPolicy,
};

/// Owns the view state and its subscribers. Every event is applied to the state
/// first; subscribers are then notified once with the combined change.
pub struct MapView {
    state: ViewState,
    subscribers: Vec<Box<dyn Subscriber>>,
    attached: bool,
}

impl MapView {
    /// Build a view from already-loaded boundary documents (one per configured layer).
    pub fn new(config: MapConfig, records: Vec<Record>, docs: &[Value]) -> Result<Self> {
        Ok(Self::with_subscribers(ViewState::new(config, records, docs)?, default_subscribers()))
    }

    /// Fetch every layer's boundaries, then build the view. Nothing is built unless all layers load.
    pub async fn load<F: Fetch>(config: MapConfig, records: Vec<Record>, fetcher: &F) -> Result<Self> {
        config.validate()?;
        let docs = load_all(fetcher, &config.geo_layers).await?;
        Self::new(config, records, &docs)
    }

    pub fn with_subscribers(state: ViewState, subscribers: Vec<Box<dyn Subscriber>>) -> Self {
        Self { state, subscribers, attached: false }
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn Subscriber>) {
        self.subscribers.push(subscriber);
    }

    #[inline]
    pub fn state(&self) -> &ViewState { &self.state }

    pub fn years(&self) -> &[i32] { self.state.years() }

    pub fn current_year(&self) -> i32 { self.state.current_year() }

    pub fn filters(&self) -> &FilterSelection { self.state.filters() }

    pub fn selected(&self) -> &[FeatureHandle] { self.state.selection().selected() }

    pub fn color_of(&self, handle: FeatureHandle) -> Rgb { self.state.color_of(handle) }

    pub fn record_of(&self, handle: FeatureHandle) -> Option<&Record> { self.state.record_of(handle) }

    pub fn info(&self, handle: FeatureHandle) -> Option<InfoContent> { self.state.info(handle) }

    /// First render: layer visibility for the surface's zoom, base styles, fills and panels.
    pub fn attach(&mut self, surface: &mut dyn RenderSurface) -> Result<StateChange> {
        ensure!(!self.attached, "[view] Map view is already attached to a surface");
        self.attached = true;

        let change = StateChange {
            initial: true,
            visibility: self.state.visibility.update(surface.zoom()),
            ..Default::default()
        };
        tracing::debug!("[view] Attached at zoom {}; visible layers {:?}",
            surface.zoom(), self.state.visibility.visible_layers().collect::<Vec<_>>());
        self.notify(&change, surface)?;
        Ok(change)
    }

    /// Apply `event` and notify subscribers. Returns what changed.
    pub fn dispatch(&mut self, event: UiEvent, surface: &mut dyn RenderSurface) -> Result<StateChange> {
        ensure!(self.attached, "[view] Events dispatched before the view was attached");
        let change = self.apply(event, surface.zoom())?;
        if !change.is_empty() {
            self.notify(&change, surface)?;
        }
        Ok(change)
    }

    fn apply(&mut self, event: UiEvent, zoom: f64) -> Result<StateChange> {
        let state = &mut self.state;
        let mut change = StateChange::default();

        match event {
            UiEvent::Click(handle) => {
                let layer = state.boundaries.layer_of(handle)
                    .ok_or_else(|| anyhow!("[view] Unknown feature handle {handle}"))?;
                if !state.visibility.is_visible(layer) {
                    tracing::debug!("[view] Ignoring click on {handle} in hidden layer {layer}");
                    return Ok(change);
                }

                change.selection = match state.selection.policy() {
                    SelectionPolicy::Single => state.selection.select(handle).into_vec(),
                    SelectionPolicy::Multi => state.selection.toggle(handle)?.into_vec(),
                };
                if state.selection.is_selected(handle) {
                    change.focus = Some(handle);
                }

                if let Some(filters) = state.derived_filters(layer) {
                    if filters != state.filters {
                        state.filters = filters.clone();
                        change.filters_changed = true;
                    }
                    change.synced_filters = Some(filters);
                }
            }
            UiEvent::ZoomEnd => {
                change.visibility = state.visibility.update(zoom);
                if !change.visibility.hidden.is_empty() {
                    let hidden = &change.visibility.hidden;
                    let boundaries = &state.boundaries;
                    change.selection = state.selection
                        .clear_where(|h| boundaries.layer_of(h).is_some_and(|l| hidden.contains(&l)))
                        .into_vec();
                }
            }
            UiEvent::YearInput(index) => {
                let years = state.years().len();
                if index >= years {
                    bail!("[view] Year index {index} out of range (have {years} years)");
                }
                if index != state.year_index {
                    state.year_index = index;
                    change.year_changed = true;
                }
            }
            UiEvent::StepYear => {
                let years = state.years().len();
                let next = (state.year_index + 1) % years;
                if next != state.year_index {
                    state.year_index = next;
                    change.year_changed = true;
                }
            }
            UiEvent::UpdateFilters(filters) => {
                if filters != state.filters {
                    state.filters = filters;
                    change.filters_changed = true;
                }
            }
            UiEvent::Resize => change.refit = true,
        }

        if change.year_changed {
            tracing::debug!("[view] Year is now {}", state.current_year());
        }
        Ok(change)
    }

    fn notify(&mut self, change: &StateChange, surface: &mut dyn RenderSurface) -> Result<()> {
        for subscriber in &mut self.subscribers {
            subscriber.on_change(&self.state, change, surface)?;
        }
        Ok(())
    }
}
