//! The map view: one owning object that turns UI events into a single
//! state-change notification and fans it out to render subscribers.

mod event;
mod map_view;
mod state;
mod subscribers;
mod surface;

pub use event::{StateChange, UiEvent};
pub use map_view::MapView;
pub use state::ViewState;
pub use subscribers::{FilterSyncSubscriber, LayerSubscriber, PanelSubscriber, StyleSubscriber, Subscriber};
pub use surface::{CommandBuffer, InfoContent, Panel, RenderSurface, SelectionItem, SurfaceCommand};
