use anyhow::{Result, ensure};
use serde::Serialize;

use super::{ColorRange, Rgb};
use crate::data::ValueRange;

/// One legend row: the swatch color of a break and its display label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub color: Rgb,
    pub lower: f64,
    pub upper: Option<f64>, // None for the final open-ended row
    pub label: String,
}

/// Quantized choropleth scale: `classes` equal-width classes over a fixed value range,
/// each painted with one color sampled from a gradient, plus a no-data color.
#[derive(Debug, Clone)]
pub struct ColorScale {
    stops: Vec<Rgb>,
    range: ValueRange,
    breaks: Vec<f64>,
    no_data: Rgb,
}

impl ColorScale {
    pub fn new(colors: &ColorRange, range: ValueRange, classes: usize, no_data: Rgb) -> Result<Self> {
        ensure!(classes >= 1, "[color::scale] At least one color class is required");
        let stops = colors.stops()?;

        let step = range.span() / classes as f64;
        let breaks = (0..=classes)
            .map(|i| if i == classes { range.max } else { range.min + step * i as f64 })
            .collect();

        Ok(Self { stops, range, breaks, no_data })
    }

    #[inline]
    pub fn classes(&self) -> usize { self.breaks.len() - 1 }

    #[inline]
    pub fn range(&self) -> ValueRange { self.range }

    #[inline]
    pub fn no_data_color(&self) -> Rgb { self.no_data }

    /// Class boundaries at full precision: `classes + 1` values from min to max.
    #[inline]
    pub fn legend_breaks(&self) -> &[f64] { &self.breaks }

    /// Class index of a finite value. Values below the range land in the first class,
    /// values at or above the maximum in the last.
    pub fn class_of(&self, value: f64) -> usize {
        let reached = self.breaks.iter().take_while(|&&b| value >= b).count();
        reached.saturating_sub(1).min(self.classes() - 1)
    }

    /// Color of a value; missing or non-finite values get the no-data color.
    pub fn color_for(&self, value: Option<f64>) -> Rgb {
        match value {
            Some(v) if v.is_finite() => self.class_color(self.class_of(v)),
            _ => self.no_data,
        }
    }

    /// Color of class `class`, sampled evenly along the gradient from first to last stop.
    pub fn class_color(&self, class: usize) -> Rgb {
        let n = self.classes();
        let t = if n > 1 { class.min(n - 1) as f64 / (n - 1) as f64 } else { 0.0 };
        self.sample(t)
    }

    fn sample(&self, t: f64) -> Rgb {
        let segments = self.stops.len() - 1;
        if segments == 0 { return self.stops[0] }

        let pos = t.clamp(0.0, 1.0) * segments as f64;
        let i = (pos.floor() as usize).min(segments - 1);
        self.stops[i].lerp(self.stops[i + 1], pos - i as f64)
    }

    /// Legend rows, one per break. Labels are rounded to two decimals for display only.
    pub fn legend_items(&self) -> Vec<LegendItem> {
        let breaks = self.legend_breaks();
        breaks.iter().enumerate()
            .map(|(i, &lower)| {
                let upper = breaks.get(i + 1).copied();
                let label = match upper {
                    Some(upper) => format!("{}\u{2013}{}", round2(lower), round2(upper)),
                    None => format!("{}+", round2(lower)),
                };
                LegendItem { color: self.color_for(Some(lower)), lower, upper, label }
            })
            .collect()
    }
}

/// Round to two decimal places for display.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
