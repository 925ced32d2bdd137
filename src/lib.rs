//! img2palette - A dominant color palette extractor
//!
//! This library reduces a raster image (PNG or JPEG) to a short list of its
//! most frequent colors, each with the number of sampled pixels it covers.
//!
//! ## Pipeline
//!
//! - **Downscaling** to a bounded width with a Lanczos3 filter
//! - **Classification** dropping pixels below an alpha threshold
//! - **Quantization** of each channel down to a multiple of a fixed step
//! - **Aggregation** of occurrence counts per quantized color
//! - **Ranking** by descending count, ties broken by RGB value
//!
//! ## Example
//!
//! ```rust,no_run
//! use img2palette::{extract_palette_from_path, ExtractOptions};
//! use std::path::Path;
//!
//! let options = ExtractOptions {
//!     palette_size: 8,
//!     ..Default::default()
//! };
//!
//! let palette = extract_palette_from_path(Path::new("input.png"), &options)
//!     .expect("Extraction failed");
//! for color in &palette {
//!     println!("{} {}", color.hex, color.count);
//! }
//! ```

pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod exporter;
pub mod image_processor;
pub mod palette;
pub mod ranker;

pub use aggregator::Aggregator;
pub use classifier::{
    quantize_channel, PixelClassifier, DEFAULT_QUANTIZATION_STEP, DEFAULT_TRANSPARENCY_THRESHOLD,
};
pub use error::{PaletteError, Result};
pub use exporter::{export, ExportFormat};
pub use image_processor::{decode_image, downscale, load_image, Bitmap, MAX_UPLOAD_SIZE};
pub use palette::{Color, Palette, Rgb};
pub use ranker::{rank, DEFAULT_PALETTE_SIZE};

use image::DynamicImage;
use log::debug;
use std::path::Path;

/// Default downscale target width in pixels
pub const DEFAULT_MAX_WIDTH: u32 = 200;

/// Options for palette extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Images wider than this are downscaled to it (default: 200, 0 disables)
    pub max_width: u32,
    /// Pixels with alpha below this, on a 16-bit scale, are ignored (default: 32768)
    pub transparency_threshold: u16,
    /// Channels are rounded down to multiples of this (default: 32)
    pub quantization_step: u8,
    /// Maximum number of colors returned (default: 6)
    pub palette_size: usize,
    /// Largest encoded input accepted, in bytes (default: 10 MiB)
    pub max_upload: u64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            transparency_threshold: DEFAULT_TRANSPARENCY_THRESHOLD,
            quantization_step: DEFAULT_QUANTIZATION_STEP,
            palette_size: DEFAULT_PALETTE_SIZE,
            max_upload: MAX_UPLOAD_SIZE,
        }
    }
}

impl ExtractOptions {
    /// Build the pixel classifier for these options.
    ///
    /// Fails with [`PaletteError::InvalidQuantizationStep`] when the step is zero.
    pub fn classifier(&self) -> Result<PixelClassifier> {
        PixelClassifier::new(self.transparency_threshold, self.quantization_step)
    }
}

/// Count quantized colors over every pixel of `image` after downscaling.
///
/// This is the unranked intermediate result; [`extract_palette`] ranks it.
pub fn aggregate(image: &DynamicImage, options: &ExtractOptions) -> Result<Aggregator> {
    let classifier = options.classifier()?;
    let bitmap = downscale(image, options.max_width)?;
    let aggregator = Aggregator::from_bitmap(&bitmap, &classifier);

    debug!(
        "sampled {}x{} bitmap: {} accepted, {} transparent, {} distinct colors",
        bitmap.width,
        bitmap.height,
        aggregator.accepted(),
        aggregator.rejected(),
        aggregator.distinct()
    );

    Ok(aggregator)
}

/// Extract the dominant colors of a decoded image
///
/// # Arguments
///
/// * `image` - The decoded image; it is only read
/// * `options` - Extraction options
///
/// # Returns
///
/// At most `options.palette_size` colors, most frequent first. A palette size
/// of zero or an image with no opaque pixels yields an empty palette.
///
/// # Errors
///
/// [`PaletteError::DegenerateInput`] for zero-width or zero-height images and
/// [`PaletteError::InvalidQuantizationStep`] for a step of zero.
pub fn extract_palette(image: &DynamicImage, options: &ExtractOptions) -> Result<Palette> {
    let aggregator = aggregate(image, options)?;
    Ok(rank(aggregator.into_colors(), options.palette_size))
}

/// Decode a PNG or JPEG payload and extract its palette.
pub fn extract_palette_from_bytes(bytes: &[u8], options: &ExtractOptions) -> Result<Palette> {
    let image = decode_image(bytes, options.max_upload)?;
    extract_palette(&image, options)
}

/// Load a PNG or JPEG file and extract its palette.
pub fn extract_palette_from_path(path: &Path, options: &ExtractOptions) -> Result<Palette> {
    let image = load_image(path, options.max_upload)?;
    extract_palette(&image, options)
}
