//! Color parsing, palettes and the quantized choropleth scale.

mod palette;
mod rgb;
mod scale;

pub use palette::{ColorRange, Palette};
pub use rgb::Rgb;
pub use scale::{ColorScale, LegendItem};
pub(crate) use scale::round2;
