//! Item and page processing.
//!
//! Every declared photo and asset becomes a full-size copy plus a `.small`
//! derivative under the page's output directory:
//!
//! ```text
//! public/photos/
//! └── japan/
//!     ├── shrine.JPG             # photo copy, named by id
//!     ├── shrine.small.JPG       # derivative (≤ 2000px, ≤ 1 MiB)
//!     └── assets/
//!         ├── map.png
//!         └── map.small.png
//! ```
//!
//! ## Error isolation
//!
//! Item failures never escape this module as `Err`. Each item yields an
//! [`ItemReport`] whose [`ItemStatus`] records how far it got:
//!
//! | Outcome | Copy on disk | Photo metadata |
//! |---|---|---|
//! | [`Complete`](ItemStatus::Complete) | yes, plus derivative | extracted |
//! | [`DerivativeFailed`](ItemStatus::DerivativeFailed) | yes | extracted |
//! | [`Failed`](ItemStatus::Failed) | no | all absent |
//!
//! Only structural problems with a page (an unknown location scheme, an
//! output directory that cannot be created) abort, via [`PipelineError`].
//!
//! ## Data flow
//!
//! Processors never mutate the input manifest. Photos return their extracted
//! metadata alongside the report, and [`process_page`] folds those into a fresh
//! [`Page`] snapshot.

use crate::imaging::{BackendError, Derivative, DerivativeConstraints, ImageBackend};
use crate::imaging::{create_derivative, extract_metadata};
use crate::location::Location;
use crate::metadata::{CameraMetadata, TagIssue};
use crate::naming::item_filename;
use crate::pipeline::PipelineError;
use crate::types::{Asset, Page, Photo};
use indexmap::IndexMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Subdirectory of a page's output directory that holds assets.
pub const ASSETS_DIR: &str = "assets";

#[derive(Error, Debug)]
pub enum ItemError {
    #[error("Source not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to copy to {path}: {source}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot read metadata from {path}: {source}")]
    Metadata { path: PathBuf, source: BackendError },
    #[error("Derivative failed: {0}")]
    Derivative(#[from] BackendError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Asset,
    Photo,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Asset => write!(f, "asset"),
            ItemKind::Photo => write!(f, "photo"),
        }
    }
}

#[derive(Debug)]
pub enum ItemStatus {
    /// Copy and derivative both written.
    Complete { copy: PathBuf, derivative: Derivative },
    /// Copy written; the derivative could not be produced.
    DerivativeFailed { copy: PathBuf, error: ItemError },
    /// Nothing usable was written.
    Failed(ItemError),
}

/// What happened to one photo or asset.
#[derive(Debug)]
pub struct ItemReport {
    pub page_id: String,
    pub item_id: String,
    pub kind: ItemKind,
    /// Resolved source path.
    pub source: PathBuf,
    pub status: ItemStatus,
    /// Tags that were present but could not be coerced.
    pub warnings: Vec<TagIssue>,
}

impl ItemReport {
    /// Any outcome short of a complete copy + derivative.
    pub fn is_failure(&self) -> bool {
        !matches!(self.status, ItemStatus::Complete { .. })
    }

    /// The underlying error, if the item did not complete.
    pub fn error(&self) -> Option<&ItemError> {
        match &self.status {
            ItemStatus::Complete { .. } => None,
            ItemStatus::DerivativeFailed { error, .. } => Some(error),
            ItemStatus::Failed(error) => Some(error),
        }
    }
}

/// A processed photo: its report plus the metadata to fold back into the page.
///
/// `metadata` is `None` when the photo failed outright.
#[derive(Debug)]
pub struct PhotoOutcome {
    pub report: ItemReport,
    pub metadata: Option<CameraMetadata>,
}

/// A processed page: an enriched snapshot and one report per item, assets
/// first, each group in manifest order.
#[derive(Debug)]
pub struct PageOutcome {
    pub page: Page,
    pub items: Vec<ItemReport>,
}

/// Shared per-page inputs for the item processors.
pub struct ItemContext<'a, B: ImageBackend> {
    pub backend: &'a B,
    pub page_id: &'a str,
    pub location: &'a Location,
    /// `<output_root>/<page_id>/`
    pub output_dir: &'a Path,
    pub constraints: &'a DerivativeConstraints,
}

/// Copy an asset into `assets/` and derive its `.small` variant.
pub fn process_asset<B: ImageBackend>(
    ctx: &ItemContext<'_, B>,
    id: &str,
    asset: &Asset,
) -> ItemReport {
    let source = ctx.location.resolve(&asset.src);
    let copy = ctx
        .output_dir
        .join(ASSETS_DIR)
        .join(item_filename(id, &asset.src));

    let status = match copy_file(&source, &copy) {
        Ok(()) => derive(ctx, copy),
        Err(error) => ItemStatus::Failed(error),
    };

    report(ctx, id, ItemKind::Asset, source, status, Vec::new())
}

/// Extract a photo's metadata, copy it, and derive its `.small` variant.
///
/// An undecodable source fails the photo before anything is written.
pub fn process_photo<B: ImageBackend>(
    ctx: &ItemContext<'_, B>,
    id: &str,
    photo: &Photo,
) -> PhotoOutcome {
    let source = ctx.location.resolve(&photo.src);
    let copy = ctx.output_dir.join(item_filename(id, &photo.src));

    let bytes = match read_source(&source) {
        Ok(bytes) => bytes,
        Err(error) => return failed_photo(ctx, id, source, error),
    };

    let extraction = match extract_metadata(ctx.backend, &bytes) {
        Ok(extraction) => extraction,
        Err(source_err) => {
            let error = ItemError::Metadata {
                path: source.clone(),
                source: source_err,
            };
            return failed_photo(ctx, id, source, error);
        }
    };
    for issue in &extraction.issues {
        warn!(page = ctx.page_id, photo = id, %issue, "uncoercible tag");
    }
    if !extraction.metadata.is_complete() {
        debug!(
            page = ctx.page_id,
            photo = id,
            missing = ?extraction.metadata.missing_fields(),
            "partial metadata"
        );
    }

    if let Err(source_err) = std::fs::write(&copy, &bytes) {
        let error = ItemError::Copy {
            path: copy,
            source: source_err,
        };
        return failed_photo(ctx, id, source, error);
    }

    let status = derive(ctx, copy);
    PhotoOutcome {
        report: report(ctx, id, ItemKind::Photo, source, status, extraction.issues),
        metadata: Some(extraction.metadata),
    }
}

/// Process one page: assets first, then photos, each in manifest order.
///
/// The location is resolved before anything touches the filesystem, so a page
/// with an unknown scheme leaves no output directory behind. `on_item` is
/// called as each item finishes.
pub fn process_page<B: ImageBackend>(
    backend: &B,
    page_id: &str,
    page: &Page,
    output_root: &Path,
    constraints: &DerivativeConstraints,
    mut on_item: impl FnMut(&ItemReport),
) -> Result<PageOutcome, PipelineError> {
    let location = Location::parse(&page.location)?;

    let output_dir = output_root.join(page_id);
    let assets_dir = output_dir.join(ASSETS_DIR);
    std::fs::create_dir_all(&assets_dir).map_err(|source| PipelineError::CreateDir {
        path: assets_dir.clone(),
        source,
    })?;

    let ctx = ItemContext {
        backend,
        page_id,
        location: &location,
        output_dir: &output_dir,
        constraints,
    };

    let mut items = Vec::with_capacity(page.assets.len() + page.photos.len());
    for (id, asset) in &page.assets {
        let report = process_asset(&ctx, id, asset);
        on_item(&report);
        items.push(report);
    }

    let mut photos = IndexMap::with_capacity(page.photos.len());
    for (id, photo) in &page.photos {
        let outcome = process_photo(&ctx, id, photo);
        on_item(&outcome.report);
        let metadata = outcome.metadata.unwrap_or_default();
        photos.insert(id.clone(), Photo::enriched(&photo.src, metadata));
        items.push(outcome.report);
    }

    Ok(PageOutcome {
        page: Page {
            photos,
            ..page.clone()
        },
        items,
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn read_source(path: &Path) -> Result<Vec<u8>, ItemError> {
    std::fs::read(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => ItemError::SourceNotFound(path.to_path_buf()),
        _ => ItemError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn copy_file(source: &Path, dest: &Path) -> Result<(), ItemError> {
    if !source.is_file() {
        return Err(ItemError::SourceNotFound(source.to_path_buf()));
    }
    std::fs::copy(source, dest)
        .map(|_| ())
        .map_err(|err| ItemError::Copy {
            path: dest.to_path_buf(),
            source: err,
        })
}

fn derive<B: ImageBackend>(ctx: &ItemContext<'_, B>, copy: PathBuf) -> ItemStatus {
    match create_derivative(ctx.backend, &copy, ctx.constraints) {
        Ok(derivative) => ItemStatus::Complete { copy, derivative },
        Err(err) => ItemStatus::DerivativeFailed {
            copy,
            error: err.into(),
        },
    }
}

fn failed_photo<B: ImageBackend>(
    ctx: &ItemContext<'_, B>,
    id: &str,
    source: PathBuf,
    error: ItemError,
) -> PhotoOutcome {
    PhotoOutcome {
        report: report(
            ctx,
            id,
            ItemKind::Photo,
            source,
            ItemStatus::Failed(error),
            Vec::new(),
        ),
        metadata: None,
    }
}

fn report<B: ImageBackend>(
    ctx: &ItemContext<'_, B>,
    id: &str,
    kind: ItemKind,
    source: PathBuf,
    status: ItemStatus,
    warnings: Vec<TagIssue>,
) -> ItemReport {
    match &status {
        ItemStatus::Complete { derivative, .. } => debug!(
            page = ctx.page_id,
            %kind,
            id,
            width = derivative.width,
            height = derivative.height,
            bytes = derivative.bytes,
            "item complete"
        ),
        ItemStatus::DerivativeFailed { error, .. } => {
            warn!(page = ctx.page_id, %kind, id, %error, "derivative failed, copy kept")
        }
        ItemStatus::Failed(error) => warn!(page = ctx.page_id, %kind, id, %error, "item failed"),
    }
    ItemReport {
        page_id: ctx.page_id.to_string(),
        item_id: id.to_string(),
        kind,
        source,
        status,
        warnings,
    }
}
