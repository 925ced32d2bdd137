use crate::classifier::PixelClassifier;
use crate::image_processor::Bitmap;
use crate::palette::{Color, Rgb};
use std::collections::HashMap;

/// Occurrence counts per quantized color for a single extraction.
#[derive(Debug, Default, Clone)]
pub struct Aggregator {
    counts: HashMap<Rgb, u64>,
    accepted: u64,
    rejected: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every pixel of `bitmap` in raster order and count the survivors.
    pub fn from_bitmap(bitmap: &Bitmap, classifier: &PixelClassifier) -> Self {
        let mut aggregator = Self::new();
        for pixel in &bitmap.pixels {
            match classifier.classify(pixel) {
                Some(rgb) => aggregator.add(rgb),
                None => aggregator.reject(),
            }
        }
        aggregator
    }

    pub fn add(&mut self, rgb: Rgb) {
        *self.counts.entry(rgb).or_insert(0) += 1;
        self.accepted += 1;
    }

    pub fn reject(&mut self) {
        self.rejected += 1;
    }

    pub fn count_of(&self, rgb: &Rgb) -> u64 {
        self.counts.get(rgb).copied().unwrap_or(0)
    }

    /// Number of distinct quantized colors seen.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Pixels that passed the transparency filter.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Pixels dropped as transparent.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Unordered colors with their counts.
    pub fn into_colors(self) -> Vec<Color> {
        self.counts
            .into_iter()
            .map(|(rgb, count)| Color::new(rgb, count))
            .collect()
    }
}
