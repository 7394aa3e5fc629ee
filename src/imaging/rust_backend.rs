//! Pure Rust image backend with no external tools.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | EXIF | `kamadak-exif` (see [`exif_reader`](super::exif_reader)) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `image::DynamicImage::resize` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//! | Encode → PNG / TIFF / WebP | `image` crate (lossless) |
//!
//! ## Meeting the byte budget
//!
//! Encoding happens in memory so each attempt can be measured before anything
//! touches disk:
//!
//! 1. Fit the longest edge to `max_dimension` (never upscale).
//! 2. Lossy formats: step quality down to `min_quality` until the file fits.
//! 3. Still too big (or lossless): shrink dimensions 20% at a time, at the
//!    lowest quality tried, until the file fits or the image is 1px thin.

use super::backend::{BackendError, Derivative, ImageBackend};
use super::calculations::{fit_within, shrink};
use super::params::{DerivativeParams, Quality};
use crate::metadata::Extraction;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Output formats the backend can encode, keyed by lowercase extension.
const OUTPUT_FORMATS: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Output format for `path`, from its extension (case-insensitive).
fn output_format(path: &Path) -> Result<ImageFormat, BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    OUTPUT_FORMATS
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, format)| *format)
        .ok_or_else(|| {
            BackendError::ProcessingFailed(format!("Unsupported output format: '{}'", ext))
        })
}

fn is_lossy(format: ImageFormat) -> bool {
    format == ImageFormat::Jpeg
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode `img` in memory.
fn encode(img: &DynamicImage, format: ImageFormat, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    let result = match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
            rgb.write_with_encoder(encoder)
        }
        other => img.write_to(&mut Cursor::new(&mut buf), other),
    };
    result.map_err(|e| BackendError::ProcessingFailed(format!("{format:?} encode failed: {e}")))?;
    Ok(buf)
}

fn resize_to(img: &DynamicImage, dims: (u32, u32)) -> DynamicImage {
    if (img.width(), img.height()) == dims {
        img.clone()
    } else {
        img.resize_exact(dims.0, dims.1, FilterType::Lanczos3)
    }
}

impl ImageBackend for RustBackend {
    fn read_metadata(&self, bytes: &[u8]) -> Result<Extraction, BackendError> {
        super::exif_reader::read_exif(bytes)
    }

    fn derive(&self, params: &DerivativeParams) -> Result<Derivative, BackendError> {
        let constraints = &params.constraints;
        let format = output_format(&params.output)?;
        let img = load_image(&params.source)?;

        let mut dims = fit_within((img.width(), img.height()), constraints.max_dimension);
        let mut quality = constraints.quality.max(constraints.min_quality);
        let mut resized = resize_to(&img, dims);

        loop {
            let encoded = encode(&resized, format, quality)?;
            let bytes = encoded.len() as u64;

            if bytes <= constraints.max_bytes {
                std::fs::write(&params.output, &encoded)?;
                return Ok(Derivative {
                    path: params.output.clone(),
                    width: dims.0,
                    height: dims.1,
                    bytes,
                    quality,
                });
            }

            if is_lossy(format) && quality > constraints.min_quality {
                quality = quality.lowered(constraints.quality_step, constraints.min_quality);
                continue;
            }

            dims = shrink(dims).ok_or_else(|| {
                BackendError::ProcessingFailed(format!(
                    "{} cannot fit in {} bytes",
                    params.source.display(),
                    constraints.max_bytes
                ))
            })?;
            resized = resize_to(&img, dims);
        }
    }
}
