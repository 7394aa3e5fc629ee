//! Reading the input manifest and writing the enriched one.
//!
//! The input is normally TOML:
//!
//! ```toml
//! [pages.japan]
//! title = "Japan"
//! date = "2024-04-02"
//! location = "local:/photos/2024-japan"
//!
//! [pages.japan.assets.map]
//! src = "route.png"
//!
//! [pages.japan.photos.shrine]
//! src = "DSCF0042.JPG"
//! ```
//!
//! A `.json` manifest is decoded with the same shape, which lets a previously
//! written output manifest be fed straight back in. The output is always
//! pretty-printed JSON with absent metadata as `null`.

use crate::types::Manifest;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to decode manifest {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to decode manifest {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to write manifest {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode manifest: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Input encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Json,
}

impl ManifestFormat {
    /// `.json` (any case) is JSON; everything else is TOML.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ManifestFormat::Json,
            _ => ManifestFormat::Toml,
        }
    }
}

/// Read and decode the manifest at `path`.
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode_manifest(&content, ManifestFormat::for_path(path), path)
}

/// Decode manifest text. `path` is only used for error context.
pub fn decode_manifest(
    content: &str,
    format: ManifestFormat,
    path: &Path,
) -> Result<Manifest, ManifestError> {
    match format {
        ManifestFormat::Toml => toml::from_str(content).map_err(|source| ManifestError::Toml {
            path: path.to_path_buf(),
            source,
        }),
        ManifestFormat::Json => {
            serde_json::from_str(content).map_err(|source| ManifestError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Serialize `manifest` as pretty JSON.
pub fn encode_manifest(manifest: &Manifest) -> Result<String, ManifestError> {
    Ok(serde_json::to_string_pretty(manifest)?)
}

/// Write `manifest` to `path` as pretty JSON, creating parent directories.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
    let json = encode_manifest(manifest)?;
    let write_err = |source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, json).map_err(write_err)
}
