//! SVG snapshot export of the choropleth.

mod proj;
mod render;
mod writer;

pub use render::{render_svg, render_svg_string};
