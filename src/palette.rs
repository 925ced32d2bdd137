//! Palette data types shared by the aggregator, ranker and exporters.

use serde::Serialize;

/// An 8-bit RGB triple. Ordering follows the packed value `r << 16 | g << 8 | b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn packed(&self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A palette entry: a quantized color and how many sampled pixels fell into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Color {
    pub hex: String,
    pub rgb: Rgb,
    pub count: u64,
}

impl Color {
    pub fn new(rgb: Rgb, count: u64) -> Self {
        Self {
            hex: rgb.to_hex(),
            rgb,
            count,
        }
    }
}

/// Colors ordered by descending count. Serializes as `{"colors": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub colors: Vec<Color>,
}

impl Palette {
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Color> {
        self.colors.iter()
    }

    /// Sum of counts over the entries kept in this palette.
    pub fn total_count(&self) -> u64 {
        self.colors.iter().map(|c| c.count).sum()
    }

    /// Share of `color` among the palette's entries, in percent.
    pub fn percentage(&self, color: &Color) -> f64 {
        let total = self.total_count();
        if total == 0 {
            return 0.0;
        }
        color.count as f64 / total as f64 * 100.0
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Color;
    type IntoIter = std::slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}
