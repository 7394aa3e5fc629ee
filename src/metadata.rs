//! Photographic metadata records.
//!
//! Six fields are extracted from each photo's EXIF block:
//!
//! | Field | EXIF tag | Type |
//! |---|---|---|
//! | `make` | `Make` (0x010F) | text |
//! | `model` | `Model` (0x0110) | text |
//! | `iso` | `PhotographicSensitivity` (0x8827) | integer |
//! | `f_stop` | `FNumber` (0x829D) | decimal |
//! | `focal_length` | `FocalLength` (0x920A) | decimal, mm |
//! | `exposure_time` | `ExposureTime` (0x829A) | decimal, seconds |
//!
//! ## Absence vs. coercion failure
//!
//! Each field is resolved independently. A tag that is simply missing leaves
//! its field `None`. A tag that is present but cannot be read as the expected
//! type (an ISO stored as text, a rational with a zero denominator) also leaves
//! the field `None`, but is additionally reported as a [`TagIssue`] so the run
//! summary can flag suspicious files. Neither case fails the photo; only an
//! undecodable byte stream does (see
//! [`BackendError::Malformed`](crate::imaging::BackendError::Malformed)).

use std::fmt;

/// Camera and exposure metadata for one photo. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraMetadata {
    pub make: Option<String>,
    pub model: Option<String>,
    pub iso: Option<u32>,
    pub f_stop: Option<f64>,
    pub focal_length: Option<f64>,
    pub exposure_time: Option<f64>,
}

impl CameraMetadata {
    /// True when every field is populated.
    pub fn is_complete(&self) -> bool {
        self.make.is_some()
            && self.model.is_some()
            && self.iso.is_some()
            && self.f_stop.is_some()
            && self.focal_length.is_some()
            && self.exposure_time.is_some()
    }

    /// Names of fields that are absent, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.make.is_none() {
            missing.push("make");
        }
        if self.model.is_none() {
            missing.push("model");
        }
        if self.iso.is_none() {
            missing.push("iso");
        }
        if self.f_stop.is_none() {
            missing.push("f_stop");
        }
        if self.focal_length.is_none() {
            missing.push("focal_length");
        }
        if self.exposure_time.is_none() {
            missing.push("exposure_time");
        }
        missing
    }
}

/// A tag that was present but could not be coerced to its field's type.
#[derive(Debug, Clone, PartialEq)]
pub struct TagIssue {
    /// Manifest field name (`"iso"`, `"f_stop"`, ...).
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for TagIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Result of reading metadata from a decodable image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub metadata: CameraMetadata,
    pub issues: Vec<TagIssue>,
}

/// Relative tolerance for [`exposure_fraction`].
const FRACTION_TOLERANCE: f64 = 1e-4;

/// Largest denominator [`exposure_fraction`] will print.
const MAX_DENOMINATOR: f64 = 10_000.0;

/// Render an exposure time in seconds as a shutter-speed fraction.
///
/// Takes the first continued-fraction convergent of `seconds` within a
/// relative tolerance, which yields the small fractions photographers
/// expect: `0.004` → `"1/250"`, `0.5` → `"1/2"`, `2.0` → `"2/1"`.
/// Denominators stay at or below 10 000; a value that needs more is shown
/// as `1/<n>` when under a second and as a decimal otherwise.
/// Zero renders as `"0/1"`; negative input uses its magnitude. Non-finite
/// input yields `None`.
pub fn exposure_fraction(seconds: f64) -> Option<String> {
    if !seconds.is_finite() {
        return None;
    }
    let x = seconds.abs();
    if x == 0.0 {
        return Some("0/1".to_string());
    }

    let (mut num_prev, mut num) = (1.0, x.floor());
    let (mut den_prev, mut den) = (0.0, 1.0);
    let mut rest = x - x.floor();
    // Denominators grow at least as fast as Fibonacci numbers, so this ends
    // within a few dozen steps.
    loop {
        if ((num / den - x) / x).abs() < FRACTION_TOLERANCE {
            return Some(format!("{num:.0}/{den:.0}"));
        }
        if rest == 0.0 {
            break;
        }
        let inv = 1.0 / rest;
        let term = inv.floor();
        rest = inv - term;
        let next_den = term * den + den_prev;
        if next_den > MAX_DENOMINATOR {
            break;
        }
        (num_prev, num) = (num, term * num + num_prev);
        (den_prev, den) = (den, next_den);
    }

    let inverse = 1.0 / x;
    if x < 1.0 && inverse.is_finite() {
        Some(format!("1/{inverse:.0}"))
    } else {
        Some(format!("{x:.1}"))
    }
}
