use crate::palette::{Color, Palette};

/// Default number of colors returned.
pub const DEFAULT_PALETTE_SIZE: usize = 6;

/// Order colors by descending count and keep the first `size`.
///
/// Equal counts are ordered by ascending packed RGB value so identical input
/// always produces the same palette, whatever order the colors arrived in.
pub fn rank(mut colors: Vec<Color>, size: usize) -> Palette {
    colors.sort_unstable_by(|a, b| b.count.cmp(&a.count).then_with(|| a.rgb.cmp(&b.rgb)));
    colors.truncate(size);
    Palette { colors }
}
