//! Page location schemes.
//!
//! A page declares where its sources live with a scheme-qualified string:
//!
//! ```text
//! location = "local:/home/me/photos/2024-japan"
//!             ^^^^^ ^^^^^^^^^^^^^^^^^^^^^^^^^^^
//!             tag   scheme-specific key
//! ```
//!
//! The string is split on the **first** `:` only, so keys may themselves
//! contain colons (`local:C:/photos` resolves to `C:/photos`).
//!
//! Only `local` is understood: the key is a base directory and every item's
//! `src` is joined onto it. Any other tag is a structural problem with the
//! manifest, not with a single item, so it surfaces as a [`LocationError`]
//! that the pipeline treats as fatal.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Scheme tag for sources on the local filesystem.
pub const LOCAL_SCHEME: &str = "local";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LocationError {
    #[error("Unknown location scheme '{scheme}' in '{location}'")]
    UnknownScheme { scheme: String, location: String },
}

/// A resolved page location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Sources live under this base directory.
    Local(PathBuf),
}

impl Location {
    /// Parse a `"<type>:<key>"` location string.
    ///
    /// A string without any `:` has no scheme tag at all and is rejected the
    /// same way as an unrecognised tag.
    pub fn parse(location: &str) -> Result<Self, LocationError> {
        let (scheme, key) = location.split_once(':').unwrap_or((location, ""));
        match scheme {
            LOCAL_SCHEME if location.contains(':') => Ok(Location::Local(PathBuf::from(key))),
            _ => Err(LocationError::UnknownScheme {
                scheme: scheme.to_string(),
                location: location.to_string(),
            }),
        }
    }

    /// Base directory that item sources are resolved against.
    pub fn base_dir(&self) -> &Path {
        match self {
            Location::Local(dir) => dir,
        }
    }

    /// Resolve an item's `src` against this location.
    pub fn resolve(&self, src: &str) -> PathBuf {
        self.base_dir().join(src)
    }
}
