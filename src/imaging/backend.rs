//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between the pipeline and the two
//! opaque image capabilities it depends on:
//!
//! | Capability | Method | Failure |
//! |---|---|---|
//! | Metadata extraction | [`read_metadata`](ImageBackend::read_metadata) | [`BackendError::Malformed`] for undecodable bytes |
//! | Derivative generation | [`derive`](ImageBackend::derive) | any [`BackendError`] |
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pure Rust, statically
//! linked. Tests use the recording `MockBackend` in this module.

use super::params::{DerivativeParams, Quality};
use crate::metadata::Extraction;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a decodable image: {0}")]
    Malformed(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// A derivative written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivative {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Encoded file size.
    pub bytes: u64,
    /// Quality the final encode used (meaningless for lossless formats).
    pub quality: Quality,
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Extract camera metadata from raw image bytes.
    ///
    /// Missing or uncoercible tags are not errors; they show up as absent
    /// fields (and [`TagIssue`](crate::metadata::TagIssue)s). Only a byte
    /// stream that is not a decodable image fails.
    fn read_metadata(&self, bytes: &[u8]) -> Result<Extraction, BackendError>;

    /// Produce one derivative satisfying `params.constraints`.
    fn derive(&self, params: &DerivativeParams) -> Result<Derivative, BackendError>;
}
