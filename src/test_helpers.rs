//! Shared test utilities for the gallery-prep test suite.
//!
//! Provides image byte builders (plain, noisy, and with an embedded EXIF
//! block), a throwaway site fixture, and manifest lookups that panic with a
//! useful message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteFixture::new();
//! let dir = site.source_dir("japan");
//! site.add_source(&dir, "DSCF0042.JPG", &jpeg_with_exif(64, 48, &ExifTags::fuji()));
//! site.write_info(&format!(
//!     "[pages.japan]\ntitle = \"Japan\"\ndate = \"2024-04-02\"\nlocation = \"{}\"\n",
//!     local_location(&dir),
//! ));
//!
//! let config = site.config();
//! ```

use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::{DynamicImage, ImageFormat, RgbImage};

use crate::config::BuildConfig;
use crate::types::{Manifest, Page, Photo};

// =========================================================================
// Image bytes
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    })
}

fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// A smooth gradient JPEG with no metadata.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height), ImageFormat::Jpeg)
}

/// A smooth gradient PNG with no metadata.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height), ImageFormat::Png)
}

pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    std::fs::write(path, png_bytes(width, height)).unwrap();
}

/// A JPEG of pseudo-random noise at `quality`.
///
/// Noise defeats compression, so these files are large for their dimensions
/// and exercise the byte-budget loop.
pub fn noise_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491;
    let img = RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        image::Rgb([next(), next(), next()])
    });

    let mut buf = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(encoder)
        .unwrap();
    buf
}

// =========================================================================
// EXIF
// =========================================================================

/// Camera tags to embed with [`jpeg_with_exif`]. `None` leaves a tag out.
///
/// Rationals are `(numerator, denominator)` so tests can write values a real
/// camera never would, such as a zero denominator.
#[derive(Debug, Clone)]
pub struct ExifTags {
    pub make: Option<&'static str>,
    pub model: Option<&'static str>,
    pub iso: Option<u16>,
    pub f_number: Option<(u32, u32)>,
    pub focal_length: Option<(u32, u32)>,
    pub exposure_time: Option<(u32, u32)>,
}

impl ExifTags {
    /// A typical street shot: X100V, ISO 160, f/5.6, 23mm, 1/250s.
    pub fn fuji() -> Self {
        Self {
            make: Some("FUJIFILM"),
            model: Some("X100V"),
            iso: Some(160),
            f_number: Some((56, 10)),
            focal_length: Some((23, 1)),
            exposure_time: Some((1, 250)),
        }
    }

    fn fields(&self) -> Vec<Field> {
        let ascii = |s: &str| Value::Ascii(vec![s.as_bytes().to_vec()]);
        let rational = |(num, denom): (u32, u32)| Value::Rational(vec![Rational { num, denom }]);

        let values = [
            (Tag::Make, self.make.map(ascii)),
            (Tag::Model, self.model.map(ascii)),
            (
                Tag::PhotographicSensitivity,
                self.iso.map(|iso| Value::Short(vec![iso])),
            ),
            (Tag::FNumber, self.f_number.map(rational)),
            (Tag::FocalLength, self.focal_length.map(rational)),
            (Tag::ExposureTime, self.exposure_time.map(rational)),
        ];

        values
            .into_iter()
            .filter_map(|(tag, value)| {
                value.map(|value| Field {
                    tag,
                    ifd_num: In::PRIMARY,
                    value,
                })
            })
            .collect()
    }
}

/// A gradient JPEG with `tags` in an APP1 EXIF segment right after SOI.
pub fn jpeg_with_exif(width: u32, height: u32, tags: &ExifTags) -> Vec<u8> {
    let fields = tags.fields();
    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let jpeg = jpeg_bytes(width, height);
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "encoder output must start with SOI");

    let segment_len = u16::try_from(2 + 6 + tiff.len()).unwrap();
    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

// =========================================================================
// Site fixture
// =========================================================================

/// A temporary site root with a `sources/` tree for photo directories.
///
/// [`SiteFixture::config`] returns the stock config rooted here, so
/// `info.toml`, `public/photos/`, and `src/info.json` all live inside the
/// temp directory.
pub struct SiteFixture {
    tmp: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// Create (if needed) and return `sources/<name>/`.
    pub fn source_dir(&self, name: &str) -> PathBuf {
        let dir = self.root().join("sources").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn add_source(&self, dir: &Path, file: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(file);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    /// Write `info.toml` at the site root.
    pub fn write_info(&self, toml: &str) {
        std::fs::write(self.root().join("info.toml"), toml).unwrap();
    }

    pub fn config(&self) -> BuildConfig {
        BuildConfig::default().rooted_at(self.root())
    }

    /// `<output_root>/<page_id>/`.
    pub fn page_output(&self, page_id: &str) -> PathBuf {
        self.config().output_root.join(page_id)
    }
}

/// `local:<dir>` for a fixture directory.
pub fn local_location(dir: &Path) -> String {
    format!("local:{}", dir.display())
}

// =========================================================================
// Manifest lookups (panic with a clear message on miss)
// =========================================================================

/// Find a page by id. Panics if not found.
pub fn find_page<'a>(manifest: &'a Manifest, id: &str) -> &'a Page {
    manifest.pages.get(id).unwrap_or_else(|| {
        let ids: Vec<&str> = manifest.pages.keys().map(String::as_str).collect();
        panic!("page '{id}' not found. Available: {ids:?}")
    })
}

/// Find a photo by id within a page. Panics if not found.
pub fn find_photo<'a>(page: &'a Page, id: &str) -> &'a Photo {
    page.photos.get(id).unwrap_or_else(|| {
        let ids: Vec<&str> = page.photos.keys().map(String::as_str).collect();
        panic!(
            "photo '{id}' not found in page '{}'. Available: {ids:?}",
            page.title
        )
    })
}

/// All page ids in manifest order.
pub fn page_ids(manifest: &Manifest) -> Vec<&str> {
    manifest.pages.keys().map(String::as_str).collect()
}
