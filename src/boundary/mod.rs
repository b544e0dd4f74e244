//! Administrative boundary layers: GeoJSON parsing, feature handles,
//! the all-or-nothing boundary load and point picking.

mod family;
mod fetch;
mod geojson;
mod layer;

pub use family::{FamilyColumns, FamilyStats, link_families};
pub use fetch::{Fetch, FileFetcher, load_all};
#[cfg(feature = "download")]
pub use fetch::HttpFetcher;
pub use layer::{Boundaries, BoundaryFeature, BoundaryLayer, FeatureHandle};

#[cfg(test)]
pub(crate) use layer::tests as fixtures;
