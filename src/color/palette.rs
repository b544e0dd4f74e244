use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

use super::Rgb;

/// Named sequential ColorBrewer ramps (9-class variants).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Palette {
    BuGn,
    Blues,
    Greens,
}

const BUGN: [Rgb; 9] = [
    Rgb::new(0xf7, 0xfc, 0xfd), Rgb::new(0xe5, 0xf5, 0xf9), Rgb::new(0xcc, 0xec, 0xe6),
    Rgb::new(0x99, 0xd8, 0xc9), Rgb::new(0x66, 0xc2, 0xa4), Rgb::new(0x41, 0xae, 0x76),
    Rgb::new(0x23, 0x8b, 0x45), Rgb::new(0x00, 0x6d, 0x2c), Rgb::new(0x00, 0x44, 0x1b),
];

const BLUES: [Rgb; 9] = [
    Rgb::new(0xf7, 0xfb, 0xff), Rgb::new(0xde, 0xeb, 0xf7), Rgb::new(0xc6, 0xdb, 0xef),
    Rgb::new(0x9e, 0xca, 0xe1), Rgb::new(0x6b, 0xae, 0xd6), Rgb::new(0x42, 0x92, 0xc6),
    Rgb::new(0x21, 0x71, 0xb5), Rgb::new(0x08, 0x51, 0x9c), Rgb::new(0x08, 0x30, 0x6b),
];

const GREENS: [Rgb; 9] = [
    Rgb::new(0xf7, 0xfc, 0xf5), Rgb::new(0xe5, 0xf5, 0xe0), Rgb::new(0xc7, 0xe9, 0xc0),
    Rgb::new(0xa1, 0xd9, 0x9b), Rgb::new(0x74, 0xc4, 0x76), Rgb::new(0x41, 0xab, 0x5d),
    Rgb::new(0x23, 0x8b, 0x45), Rgb::new(0x00, 0x6d, 0x2c), Rgb::new(0x00, 0x44, 0x1b),
];

impl Palette {
    pub fn colors(&self) -> &'static [Rgb] {
        match self {
            Palette::BuGn => &BUGN,
            Palette::Blues => &BLUES,
            Palette::Greens => &GREENS,
        }
    }
}

/// Gradient definition: either explicit stops (`["#b4c5c1", "#004433"]`) or a palette name (`"BuGn"`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorRange {
    Stops(Vec<Rgb>),
    Named(Palette),
}

impl ColorRange {
    /// Gradient stops, low to high. At least one stop is required.
    pub fn stops(&self) -> Result<Vec<Rgb>> {
        let stops = match self {
            ColorRange::Stops(stops) => stops.clone(),
            ColorRange::Named(palette) => palette.colors().to_vec(),
        };
        ensure!(!stops.is_empty(), "[color] Color range must contain at least one color");
        Ok(stops)
    }
}

impl Default for ColorRange {
    fn default() -> Self {
        ColorRange::Stops(vec![Rgb::new(0xb4, 0xc5, 0xc1), Rgb::new(0x00, 0x44, 0x33)])
    }
}
