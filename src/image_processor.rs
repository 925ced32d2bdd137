use crate::error::{PaletteError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgba};
use log::debug;
use rgb::RGBA16;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Largest encoded payload accepted before decoding (10 MiB).
pub const MAX_UPLOAD_SIZE: u64 = 10 << 20;

/// A decoded bitmap with 16 bits per channel, stored row-major.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<RGBA16>,
}

impl Bitmap {
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }
}

impl From<ImageBuffer<Rgba<u16>, Vec<u16>>> for Bitmap {
    fn from(buffer: ImageBuffer<Rgba<u16>, Vec<u16>>) -> Self {
        let pixels: Vec<RGBA16> = buffer
            .pixels()
            .map(|p| RGBA16::new(p[0], p[1], p[2], p[3]))
            .collect();

        Bitmap {
            width: buffer.width(),
            height: buffer.height(),
            pixels,
        }
    }
}

/// Read and decode a PNG or JPEG file, refusing files larger than `max_upload` bytes.
pub fn load_image(path: &Path, max_upload: u64) -> Result<DynamicImage> {
    let size = std::fs::metadata(path)?.len();
    if size > max_upload {
        return Err(PaletteError::PayloadTooLarge {
            size,
            limit: max_upload,
        });
    }

    // Devices and pipes report a length of zero, so the read itself is capped too
    let bytes = read_bounded(File::open(path)?, max_upload)?;
    decode_image(&bytes, max_upload)
}

/// Read at most `max_upload` bytes from `reader`.
///
/// Stops one byte past the limit and fails with `PayloadTooLarge`, so an
/// endless stream never gets buffered whole.
pub fn read_bounded<R: Read>(reader: R, max_upload: u64) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .take(max_upload.saturating_add(1))
        .read_to_end(&mut bytes)?;

    let size = bytes.len() as u64;
    if size > max_upload {
        return Err(PaletteError::PayloadTooLarge {
            size,
            limit: max_upload,
        });
    }
    Ok(bytes)
}

/// Decode an in-memory PNG or JPEG payload.
///
/// The size limit is checked before any decoding work happens. Anything the
/// format sniffer does not recognise as PNG or JPEG is rejected.
pub fn decode_image(bytes: &[u8], max_upload: u64) -> Result<DynamicImage> {
    let size = bytes.len() as u64;
    if size > max_upload {
        return Err(PaletteError::PayloadTooLarge {
            size,
            limit: max_upload,
        });
    }

    let format = image::guess_format(bytes)
        .map_err(|_| PaletteError::UnsupportedFormat("unrecognized data".to_string()))?;
    match format {
        ImageFormat::Png | ImageFormat::Jpeg => {}
        other => {
            return Err(PaletteError::UnsupportedFormat(
                format!("{:?}", other).to_lowercase(),
            ));
        }
    }

    let img = image::load_from_memory_with_format(bytes, format)?;
    let (width, height) = img.dimensions();
    debug!("decoded {:?} image: {}x{}", format, width, height);
    Ok(img)
}

/// Dimensions after bounding the width to `max_width`, preserving aspect ratio.
///
/// Images already at or below `max_width` keep their size; they are never
/// upscaled. A `max_width` of zero disables downscaling.
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if max_width == 0 || width <= max_width {
        return (width, height);
    }

    let (w, h, mw) = (width as u64, height as u64, max_width as u64);
    let new_height = ((h * mw + w / 2) / w).max(1);
    (max_width, new_height as u32)
}

/// Shrink `image` to at most `max_width` pixels wide with a Lanczos3 filter.
pub fn downscale(image: &DynamicImage, max_width: u32) -> Result<Bitmap> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PaletteError::DegenerateInput { width, height });
    }

    let (new_width, new_height) = target_dimensions(width, height, max_width);
    let rgba = if (new_width, new_height) == (width, height) {
        image.to_rgba16()
    } else {
        debug!(
            "downscaling {}x{} -> {}x{}",
            width, height, new_width, new_height
        );
        image
            .resize_exact(new_width, new_height, FilterType::Lanczos3)
            .to_rgba16()
    };

    Ok(Bitmap::from(rgba))
}
