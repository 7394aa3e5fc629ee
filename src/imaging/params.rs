//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. The
//! [`operations`](super::operations) module fills them in from configuration
//! and the [`backend`](super::backend) turns them into pixels, so a mock
//! backend can stand in without changing operation logic.
//!
//! - [`Quality`]: lossy encoding quality (1–100). Clamped on construction.
//! - [`DerivativeConstraints`]: the size budget every derivative must meet.
//! - [`DerivativeParams`]: source, output path, and constraints for one derivative.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Step down by `step`, never below `floor`.
    pub fn lowered(self, step: u32, floor: Quality) -> Self {
        Self::new(self.0.saturating_sub(step)).max(floor)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Size budget for a derivative image.
///
/// Dimensions are reduced first (longest edge ≤ `max_dimension`), then lossy
/// quality is stepped from `quality` down to `min_quality` until the encoded
/// file fits in `max_bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivativeConstraints {
    /// Longest edge in pixels.
    pub max_dimension: u32,
    /// Encoded file size ceiling in bytes.
    pub max_bytes: u64,
    pub quality: Quality,
    pub min_quality: Quality,
    pub quality_step: u32,
}

impl Default for DerivativeConstraints {
    fn default() -> Self {
        Self {
            max_dimension: 2000,
            max_bytes: 1024 * 1024,
            quality: Quality::default(),
            min_quality: Quality::new(40),
            quality_step: 5,
        }
    }
}

/// Everything needed to produce one derivative.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub constraints: DerivativeConstraints,
}
