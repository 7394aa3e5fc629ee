//! The end-to-end run: load → process pages → serialize.
//!
//! ```text
//! Loading ──▶ Processing(page₁) ──▶ … ──▶ Processing(pageₙ) ──▶ Serializing ──▶ Done
//!    │               │                            │                  │
//!    └───────────────┴────────────────────────────┴──────────────────┴──▶ Failed
//! ```
//!
//! Pages run strictly in manifest order, one item at a time. A fatal error
//! (bad config, undecodable manifest, unknown location scheme, unwritable
//! output) moves to `Failed` and returns `Err` without writing the output
//! manifest. Per-item failures do not stop the run; they are collected in the
//! [`RunSummary`] and the enriched manifest is still written.
//!
//! Progress is reported as [`PipelineEvent`]s over an optional channel so the
//! CLI can print while the run is in flight.

use crate::config::{BuildConfig, ConfigError};
use crate::imaging::{ImageBackend, RustBackend};
use crate::location::{Location, LocationError};
use crate::manifest::{ManifestError, load_manifest, write_manifest};
use crate::metadata::TagIssue;
use crate::process::{ItemKind, ItemReport, ItemStatus, process_page};
use crate::types::Manifest;
use indexmap::IndexMap;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error("Failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0} item(s) failed")]
    ItemsFailed(usize),
    #[error("{0} problem(s) found")]
    CheckFailed(usize),
}

/// Pipeline states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Processing { page_id: String },
    Serializing,
    Done,
    Failed,
}

/// Progress events for display.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageChanged(Stage),
    PageStarted {
        page_id: String,
        title: String,
        photos: usize,
        assets: usize,
    },
    ItemProcessed {
        /// 1-based position within the page.
        index: usize,
        kind: ItemKind,
        item_id: String,
        source: PathBuf,
        progress: ItemProgress,
        warnings: Vec<String>,
    },
}

/// Owned, display-ready summary of an [`ItemStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemProgress {
    Complete { width: u32, height: u32, bytes: u64 },
    DerivativeFailed(String),
    Failed(String),
}

impl From<&ItemStatus> for ItemProgress {
    fn from(status: &ItemStatus) -> Self {
        match status {
            ItemStatus::Complete { derivative, .. } => ItemProgress::Complete {
                width: derivative.width,
                height: derivative.height,
                bytes: derivative.bytes,
            },
            ItemStatus::DerivativeFailed { error, .. } => {
                ItemProgress::DerivativeFailed(error.to_string())
            }
            ItemStatus::Failed(error) => ItemProgress::Failed(error.to_string()),
        }
    }
}

impl PipelineEvent {
    fn item(index: usize, report: &ItemReport) -> Self {
        PipelineEvent::ItemProcessed {
            index,
            kind: report.kind,
            item_id: report.item_id.clone(),
            source: report.source.clone(),
            progress: ItemProgress::from(&report.status),
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Result of a run that reached `Done`.
#[derive(Debug)]
pub struct RunSummary {
    /// The enriched manifest as written.
    pub manifest: Manifest,
    /// One report per item, in processing order.
    pub items: Vec<ItemReport>,
}

impl RunSummary {
    pub fn failures(&self) -> Vec<&ItemReport> {
        self.items.iter().filter(|i| i.is_failure()).collect()
    }

    /// Every tag issue with the item it came from.
    pub fn warnings(&self) -> Vec<(&ItemReport, &TagIssue)> {
        self.items
            .iter()
            .flat_map(|item| item.warnings.iter().map(move |w| (item, w)))
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.items.iter().all(|i| !i.is_failure())
    }

    pub fn count(&self, kind: ItemKind) -> usize {
        self.items.iter().filter(|i| i.kind == kind).count()
    }

    /// `Err(ItemsFailed)` when any item failed, so callers can exit non-zero.
    pub fn ensure_clean(&self) -> Result<(), PipelineError> {
        match self.failures().len() {
            0 => Ok(()),
            n => Err(PipelineError::ItemsFailed(n)),
        }
    }
}

/// Run the full pipeline with the pure Rust image backend.
pub fn run(
    config: &BuildConfig,
    events: Option<Sender<PipelineEvent>>,
) -> Result<RunSummary, PipelineError> {
    run_with_backend(&RustBackend::new(), config, events)
}

/// Run the full pipeline with a specific backend (allows testing with mock).
pub fn run_with_backend(
    backend: &impl ImageBackend,
    config: &BuildConfig,
    events: Option<Sender<PipelineEvent>>,
) -> Result<RunSummary, PipelineError> {
    let emit = |event: PipelineEvent| {
        if let Some(tx) = &events {
            // A receiver that hung up only loses progress output.
            tx.send(event).ok();
        }
    };

    emit(PipelineEvent::StageChanged(Stage::Loading));
    let result = execute(backend, config, &emit);
    match &result {
        Ok(summary) => {
            info!(
                items = summary.items.len(),
                failed = summary.failures().len(),
                output = %config.manifest_output.display(),
                "run complete"
            );
            emit(PipelineEvent::StageChanged(Stage::Done));
        }
        Err(err) => {
            warn!(%err, "run aborted");
            emit(PipelineEvent::StageChanged(Stage::Failed));
        }
    }
    result
}

fn execute(
    backend: &impl ImageBackend,
    config: &BuildConfig,
    emit: &impl Fn(PipelineEvent),
) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    info!(manifest = %config.manifest.display(), "loading manifest");
    let input = load_manifest(&config.manifest)?;
    let constraints = config.derivatives.constraints();

    let mut pages = IndexMap::with_capacity(input.pages.len());
    let mut items = Vec::new();

    for (page_id, page) in &input.pages {
        emit(PipelineEvent::StageChanged(Stage::Processing {
            page_id: page_id.clone(),
        }));
        emit(PipelineEvent::PageStarted {
            page_id: page_id.clone(),
            title: page.title.clone(),
            photos: page.photos.len(),
            assets: page.assets.len(),
        });
        info!(page = %page_id, location = %page.location, "processing page");

        let mut index = 0;
        let outcome = process_page(
            backend,
            page_id,
            page,
            &config.output_root,
            &constraints,
            |report| {
                index += 1;
                emit(PipelineEvent::item(index, report));
            },
        )?;

        pages.insert(page_id.clone(), outcome.page);
        items.extend(outcome.items);
    }

    emit(PipelineEvent::StageChanged(Stage::Serializing));
    let manifest = Manifest { pages };
    write_manifest(&config.manifest_output, &manifest)?;

    Ok(RunSummary { manifest, items })
}

// ============================================================================
// Check
// ============================================================================

/// A declared source that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSource {
    pub kind: ItemKind,
    pub item_id: String,
    pub path: PathBuf,
}

/// Check result for one page.
#[derive(Debug, PartialEq)]
pub struct PageCheck {
    pub page_id: String,
    pub title: String,
    /// Resolved base directory, or why it could not be resolved.
    pub location: Result<PathBuf, LocationError>,
    pub items: usize,
    pub missing: Vec<MissingSource>,
}

impl PageCheck {
    pub fn problems(&self) -> usize {
        self.missing.len() + usize::from(self.location.is_err())
    }
}

#[derive(Debug, PartialEq)]
pub struct CheckReport {
    pub pages: Vec<PageCheck>,
}

impl CheckReport {
    pub fn problems(&self) -> usize {
        self.pages.iter().map(PageCheck::problems).sum()
    }

    pub fn is_ok(&self) -> bool {
        self.problems() == 0
    }

    /// `Err(CheckFailed)` when anything would fail a build.
    pub fn ensure_ok(&self) -> Result<(), PipelineError> {
        match self.problems() {
            0 => Ok(()),
            n => Err(PipelineError::CheckFailed(n)),
        }
    }
}

/// Validate the manifest without writing anything.
///
/// Unlike a build, an unknown scheme is reported per page so a single check
/// lists every problem in the manifest.
pub fn check(config: &BuildConfig) -> Result<CheckReport, PipelineError> {
    config.validate()?;
    let manifest = load_manifest(&config.manifest)?;

    let pages = manifest
        .pages
        .iter()
        .map(|(page_id, page)| {
            let items = page.assets.len() + page.photos.len();
            let location = match Location::parse(&page.location) {
                Ok(location) => location,
                Err(err) => {
                    return PageCheck {
                        page_id: page_id.clone(),
                        title: page.title.clone(),
                        location: Err(err),
                        items,
                        missing: Vec::new(),
                    };
                }
            };

            let assets = page
                .assets
                .iter()
                .map(|(id, a)| (ItemKind::Asset, id, &a.src));
            let photos = page
                .photos
                .iter()
                .map(|(id, p)| (ItemKind::Photo, id, &p.src));
            let missing = assets
                .chain(photos)
                .map(|(kind, id, src)| (kind, id, location.resolve(src)))
                .filter(|(_, _, path)| !path.is_file())
                .map(|(kind, id, path)| MissingSource {
                    kind,
                    item_id: id.clone(),
                    path,
                })
                .collect();

            PageCheck {
                page_id: page_id.clone(),
                title: page.title.clone(),
                location: Ok(location.base_dir().to_path_buf()),
                items,
                missing,
            }
        })
        .collect();

    Ok(CheckReport { pages })
}
