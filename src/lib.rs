#![doc = "sdgmap public API"]
mod boundary;
mod color;
mod config;
mod data;
mod io;
mod selection;
mod view;
mod visibility;

#[doc(inline)]
pub use boundary::{Boundaries, BoundaryFeature, BoundaryLayer, FamilyColumns, FamilyStats, Fetch, FeatureHandle, FileFetcher, link_families, load_all};

#[cfg(feature = "download")]
#[doc(inline)]
pub use boundary::HttpFetcher;

#[doc(inline)]
pub use color::{ColorRange, ColorScale, LegendItem, Palette, Rgb};

#[doc(inline)]
pub use config::{FeatureStyle, LayerConfig, MapConfig};

#[doc(inline)]
pub use data::{DatasetIndex, FieldSelection, FilterSelection, Record, ValueRange};

#[doc(inline)]
pub use io::{read_records_csv, read_records_csv_str, read_records_json, records_from_json, render_svg, render_svg_string, write_feature_table, write_feature_table_string};

#[doc(inline)]
pub use selection::{Selection, SelectionEvent, SelectionPolicy};

#[doc(inline)]
pub use view::{CommandBuffer, FilterSyncSubscriber, InfoContent, LayerSubscriber, MapView, Panel, PanelSubscriber, RenderSurface, SelectionItem, StateChange, StyleSubscriber, Subscriber, SurfaceCommand, UiEvent, ViewState};

#[doc(inline)]
pub use visibility::{VisibilityChange, VisibilityController, ZoomRange};
