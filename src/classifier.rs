//! Per-pixel classification: transparency filtering and channel quantization.

use crate::error::{PaletteError, Result};
use crate::palette::Rgb;
use rgb::RGBA16;

/// Alpha below this (on the 16-bit scale) marks a pixel as transparent: ~50% opacity.
pub const DEFAULT_TRANSPARENCY_THRESHOLD: u16 = 32768;

/// Channel values are rounded down to multiples of this step.
pub const DEFAULT_QUANTIZATION_STEP: u8 = 32;

/// Round an 8-bit channel down to the nearest multiple of `step`.
#[inline]
pub fn quantize_channel(value: u8, step: u8) -> u8 {
    (value / step) * step
}

/// Scale a straight 16-bit channel by its pixel's alpha.
#[inline]
pub fn premultiply(value: u16, alpha: u16) -> u16 {
    (value as u32 * alpha as u32 / 65535) as u16
}

/// Keep the high-order byte of a 16-bit channel.
#[inline]
pub fn reduce_precision(value: u16) -> u8 {
    (value >> 8) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelClassifier {
    threshold: u16,
    step: u8,
}

impl PixelClassifier {
    pub fn new(threshold: u16, step: u8) -> Result<Self> {
        if step == 0 {
            return Err(PaletteError::InvalidQuantizationStep(step));
        }
        Ok(Self { threshold, step })
    }

    /// Returns `None` for pixels too transparent to count.
    ///
    /// Surviving pixels are premultiplied by their alpha before quantizing, so
    /// a half-transparent red reads darker than an opaque one.
    pub fn classify(&self, pixel: &RGBA16) -> Option<Rgb> {
        if pixel.a < self.threshold {
            return None;
        }

        let channel = |value: u16| {
            quantize_channel(reduce_precision(premultiply(value, pixel.a)), self.step)
        };
        Some(Rgb::new(channel(pixel.r), channel(pixel.g), channel(pixel.b)))
    }
}

impl Default for PixelClassifier {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_TRANSPARENCY_THRESHOLD,
            step: DEFAULT_QUANTIZATION_STEP,
        }
    }
}
