//! Error types for palette extraction

use thiserror::Error;

/// Errors that can occur while loading an image or extracting its palette
#[derive(Debug, Error)]
pub enum PaletteError {
    /// The bitmap has no pixels along one axis
    #[error("degenerate image: {width}x{height} has no pixels to sample")]
    DegenerateInput { width: u32, height: u32 },

    /// A quantization step of zero cannot bucket channel values
    #[error("invalid quantization step: {0} (must be at least 1)")]
    InvalidQuantizationStep(u8),

    /// The encoded payload exceeds the accepted upload size
    #[error("image file too large: {size} bytes (max {limit} bytes)")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// The payload is not a PNG or JPEG image
    #[error("unsupported image format: {0} (expected PNG or JPEG)")]
    UnsupportedFormat(String),

    /// The payload claimed a supported format but could not be decoded
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to serialize palette: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for palette operations
pub type Result<T> = std::result::Result<T, PaletteError>;
