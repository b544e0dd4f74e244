//! Render subscribers. Each one translates a `StateChange` into surface commands
//! for one concern; `MapView` calls them in registration order.

use anyhow::Result;

use super::{
    event::StateChange,
    state::ViewState,
    surface::{Panel, RenderSurface},
};
use crate::{config::FeatureStyle, selection::{SelectionEvent, SelectionPolicy}};

pub trait Subscriber {
    fn on_change(&mut self, state: &ViewState, change: &StateChange, surface: &mut dyn RenderSurface) -> Result<()>;
}

/// Layer visibility and viewport.
#[derive(Debug, Default)]
pub struct LayerSubscriber;

impl Subscriber for LayerSubscriber {
    fn on_change(&mut self, state: &ViewState, change: &StateChange, surface: &mut dyn RenderSurface) -> Result<()> {
        for &layer in &change.visibility.hidden {
            surface.hide_layer(layer);
        }
        for &layer in &change.visibility.shown {
            surface.show_layer(layer);
        }

        if let Some(bounds) = change.focus.and_then(|h| state.feature(h)).and_then(|f| f.bounds) {
            surface.fit_bounds(bounds);
        } else if change.refit {
            if let Some(bounds) = state.boundaries().bounds_of(state.visibility().visible_layers()) {
                surface.fit_bounds(bounds);
            }
        }
        Ok(())
    }
}

/// Feature fill colors and selection highlighting.
#[derive(Debug, Default)]
pub struct StyleSubscriber;

impl StyleSubscriber {
    fn layer_style(state: &ViewState, layer: usize, selected: bool) -> FeatureStyle {
        state.boundaries().layer(layer)
            .map(|l| if selected { l.config.style_options_selected.clone() } else { l.config.style_options.clone() })
            .unwrap_or_default()
    }
}

impl Subscriber for StyleSubscriber {
    fn on_change(&mut self, state: &ViewState, change: &StateChange, surface: &mut dyn RenderSurface) -> Result<()> {
        if change.recolor() {
            for feature in state.boundaries().features() {
                let fill = FeatureStyle::fill(state.color_of(feature.handle));
                let style = if change.initial {
                    Self::layer_style(state, feature.layer, false).merged(&fill)
                } else {
                    fill
                };
                surface.set_style(feature.handle, style);
            }
        }

        for event in &change.selection {
            match *event {
                SelectionEvent::Unselect(handle) => {
                    let Some(layer) = state.boundaries().layer_of(handle) else { continue };
                    surface.set_style(handle, Self::layer_style(state, layer, false));
                }
                SelectionEvent::Select(handle) => {
                    let Some(layer) = state.boundaries().layer_of(handle) else { continue };
                    surface.set_style(handle, Self::layer_style(state, layer, true));
                    surface.bring_to_front(handle);
                }
            }
        }
        Ok(())
    }
}

/// Legend, year label, info box and multi-select list.
#[derive(Debug, Default)]
pub struct PanelSubscriber;

impl Subscriber for PanelSubscriber {
    fn on_change(&mut self, state: &ViewState, change: &StateChange, surface: &mut dyn RenderSurface) -> Result<()> {
        if change.initial {
            surface.update_panel(Panel::Legend { items: state.scale().legend_items() });
        }
        if change.initial || change.year_changed {
            surface.update_panel(Panel::Year { year: state.current_year() });
        }

        // Values shown in the panels depend on year and filters as well as on the selection.
        if change.recolor() || !change.selection.is_empty() {
            let selected = state.selection().selected();
            let panel = match state.selection().policy() {
                SelectionPolicy::Single => Panel::Info {
                    content: selected.first().and_then(|&h| state.info(h)),
                },
                SelectionPolicy::Multi => Panel::Selections {
                    items: selected.iter().filter_map(|&h| state.selection_item(h)).collect(),
                },
            };
            surface.update_panel(panel);
        }
        Ok(())
    }
}

/// Mirrors click-derived filters into the page's filter controls.
#[derive(Debug, Default)]
pub struct FilterSyncSubscriber;

impl Subscriber for FilterSyncSubscriber {
    fn on_change(&mut self, _state: &ViewState, change: &StateChange, surface: &mut dyn RenderSurface) -> Result<()> {
        let Some(filters) = &change.synced_filters else { return Ok(()) };
        for selection in filters.iter() {
            for value in &selection.values {
                surface.check_filter(&selection.field, value);
            }
        }
        Ok(())
    }
}

/// The standard subscriber set, in notification order.
pub(super) fn default_subscribers() -> Vec<Box<dyn Subscriber>> {
    vec![
        Box::new(LayerSubscriber),
        Box::new(StyleSubscriber),
        Box::new(PanelSubscriber),
        Box::new(FilterSyncSubscriber),
    ]
}
