//! The manifest data model.
//!
//! The same types describe the input manifest (`info.toml`) and the enriched
//! output manifest (`info.json`). Photo metadata fields are output-only: they
//! may appear in input (for example when an output manifest is fed back in)
//! but every run replaces them with freshly extracted values.
//!
//! Mappings use [`IndexMap`] so pages and items are processed and serialized
//! in the order the manifest author wrote them.

use crate::metadata::CameraMetadata;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Root of the manifest: page id → page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub pages: IndexMap<String, Page>,
}

/// One gallery page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    pub date: String,
    /// Scheme-qualified source location, e.g. `"local:/photos/japan"`.
    pub location: String,
    #[serde(default)]
    pub photos: IndexMap<String, Photo>,
    #[serde(default)]
    pub assets: IndexMap<String, Asset>,
}

/// A photo: copied, EXIF-enriched, and given a derivative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    /// Source path relative to the page location.
    pub src: String,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub iso: Option<u32>,
    #[serde(default)]
    pub f_stop: Option<f64>,
    #[serde(default)]
    pub focal_length: Option<f64>,
    #[serde(default)]
    pub exposure_time: Option<f64>,
}

impl Photo {
    /// A new photo record for `src` carrying exactly `metadata`.
    ///
    /// Whatever metadata the input carried is discarded.
    pub fn enriched(src: &str, metadata: CameraMetadata) -> Self {
        Self {
            src: src.to_string(),
            make: metadata.make,
            model: metadata.model,
            iso: metadata.iso,
            f_stop: metadata.f_stop,
            focal_length: metadata.focal_length,
            exposure_time: metadata.exposure_time,
        }
    }

    /// The metadata currently attached to this photo.
    pub fn metadata(&self) -> CameraMetadata {
        CameraMetadata {
            make: self.make.clone(),
            model: self.model.clone(),
            iso: self.iso,
            f_stop: self.f_stop,
            focal_length: self.focal_length,
            exposure_time: self.exposure_time,
        }
    }
}

/// A non-photo image (cover, banner, map): copied and given a derivative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Source path relative to the page location.
    pub src: String,
}
