//! Simple 8-bit RGB colors with CSS hex parsing and formatting.

use std::{fmt, str::FromStr};

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self { Self { r, g, b } }

    /// Linear interpolation in RGB space, rounded per channel.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| -> u8 {
            (a as f64 + (b as f64 - a as f64) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb { r: mix(self.r, other.r), g: mix(self.g, other.g), b: mix(self.b, other.b) }
    }

    /// Relative luminance in [0, 1] (sRGB weights, no gamma correction).
    pub fn luminance(&self) -> f64 {
        (0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64) / 255.0
    }
}

impl fmt::Display for Rgb {
    /// Format as CSS hex: #rrggbb
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = anyhow::Error;

    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() { bail!("[color] Invalid hex color {s:?}") }
        let channel = |h: &str| u8::from_str_radix(h, 16)
            .map_err(|_| anyhow!("[color] Invalid hex color {s:?}"));
        match hex.len() {
            3 => {
                let expand = |c: &str| channel(&c.repeat(2));
                Ok(Rgb { r: expand(&hex[0..1])?, g: expand(&hex[1..2])?, b: expand(&hex[2..3])? })
            }
            6 => Ok(Rgb { r: channel(&hex[0..2])?, g: channel(&hex[2..4])?, b: channel(&hex[4..6])? }),
            _ => bail!("[color] Invalid hex color {s:?}: expected #rgb or #rrggbb"),
        }
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::Rgb;

    #[test]
    fn parse_and_format() {
        assert_eq!("#b4c5c1".parse::<Rgb>().unwrap(), Rgb::new(0xb4, 0xc5, 0xc1));
        assert_eq!("004433".parse::<Rgb>().unwrap(), Rgb::new(0x00, 0x44, 0x33));
        assert_eq!("#AAA".parse::<Rgb>().unwrap(), Rgb::new(0xaa, 0xaa, 0xaa));
        assert_eq!(Rgb::new(240, 240, 240).to_string(), "#f0f0f0");
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#zzzzzz".parse::<Rgb>().is_err());
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Rgb::new(0, 100, 200);
        let b = Rgb::new(100, 0, 255);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(50, 50, 228));
        assert_eq!(a.lerp(b, 7.0), b);
    }
}
