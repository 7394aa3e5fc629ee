//! High-level image operations.
//!
//! These functions combine naming conventions with backend execution: they
//! decide where a derivative goes, describe it as [`DerivativeParams`], and
//! hand it to the backend.

use super::backend::{BackendError, Derivative, ImageBackend};
use super::params::{DerivativeConstraints, DerivativeParams};
use crate::metadata::Extraction;
use crate::naming::derivative_path;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Extract camera metadata from raw image bytes.
pub fn extract_metadata(backend: &impl ImageBackend, bytes: &[u8]) -> Result<Extraction> {
    backend.read_metadata(bytes)
}

/// Plan a derivative for a full-size copy without executing it.
///
/// The derivative always sits beside `copy` as `<stem>.small<ext>`, and is
/// generated from the copy rather than the original source, so what ends up
/// on disk is self-consistent even if the source changes mid-run.
pub fn plan_derivative(copy: &Path, constraints: &DerivativeConstraints) -> DerivativeParams {
    DerivativeParams {
        source: copy.to_path_buf(),
        output: derivative_path(copy),
        constraints: *constraints,
    }
}

/// Create the size-constrained derivative of a full-size copy.
pub fn create_derivative(
    backend: &impl ImageBackend,
    copy: &Path,
    constraints: &DerivativeConstraints,
) -> Result<Derivative> {
    let params = plan_derivative(copy, constraints);
    backend.derive(&params)
}
