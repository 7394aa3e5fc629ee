//! CLI output formatting for builds and checks.
//!
//! # Information-First Display
//!
//! Every item leads with its positional index and id; the resolved source
//! path and the result are indented context lines. Output reads as an
//! inventory of the gallery while still letting users trace each line back to
//! a file on disk.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Japan (2 photos, 1 asset)
//!     001 map [asset]
//!         Source: /photos/japan/route.png
//!         small: 1200x800, 412 KB
//!     002 shrine [photo]
//!         Source: /photos/japan/DSCF0042.JPG
//!         small: 2000x1333, 988 KB
//!         warning: iso: expected integer, found ASCII
//! ```
//!
//! ## Summary
//!
//! ```text
//! Photos
//! japan
//!     001 shrine: FUJIFILM X100V · ISO 160 · f/5.6 · 23mm · 1/250s
//!     002 alley: (no metadata)
//!
//! Processed 2 photos, 1 asset: 1 failed, 1 warning
//!
//! Failed
//!     japan/alley [photo]: Source not found: /photos/japan/DSCF0007.JPG
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 japan: 3 items in /photos/japan
//!     missing photo alley: /photos/japan/DSCF0007.JPG
//! 002 remote: Unknown location scheme 's3' in 's3:bucket'
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::metadata::{CameraMetadata, exposure_fraction};
use crate::pipeline::{CheckReport, ItemProgress, PipelineEvent, RunSummary, Stage};
use crate::process::ItemKind;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `"1 photo"`, `"3 photos"`.
fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Human-readable byte count: `512 B`, `412 KB`, `1.4 MB`.
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    match bytes {
        b if b < KB => format!("{b} B"),
        b if b < MB => format!("{} KB", b / KB),
        b => format!("{:.1} MB", b as f64 / MB as f64),
    }
}

/// Trim a float to at most one decimal: `5.6`, `23`, `1.4`.
fn format_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

/// One-line camera metadata: `FUJIFILM X100V · ISO 160 · f/5.6 · 23mm · 1/250s`.
///
/// Absent fields are skipped; nothing at all gives `(no metadata)`.
pub fn format_metadata(meta: &CameraMetadata) -> String {
    let camera = [meta.make.as_deref(), meta.model.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let mut parts = Vec::new();
    if !camera.is_empty() {
        parts.push(camera);
    }
    if let Some(iso) = meta.iso {
        parts.push(format!("ISO {iso}"));
    }
    if let Some(f) = meta.f_stop {
        parts.push(format!("f/{}", format_decimal(f)));
    }
    if let Some(mm) = meta.focal_length {
        parts.push(format!("{}mm", format_decimal(mm)));
    }
    if let Some(fraction) = meta.exposure_time.and_then(exposure_fraction) {
        parts.push(format!("{fraction}s"));
    }

    if parts.is_empty() {
        "(no metadata)".to_string()
    } else {
        parts.join(" · ")
    }
}

// ============================================================================
// Build progress
// ============================================================================

/// Format a single pipeline event as display lines.
pub fn format_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::StageChanged(stage) => match stage {
            Stage::Loading => vec!["==> Loading manifest".to_string()],
            Stage::Serializing => vec!["==> Writing manifest".to_string()],
            // Pages announce themselves; terminal states are covered by the summary
            Stage::Processing { .. } | Stage::Done | Stage::Failed => Vec::new(),
        },
        PipelineEvent::PageStarted {
            title,
            photos,
            assets,
            ..
        } => vec![format!(
            "{} ({}, {})",
            title,
            plural(*photos, "photo"),
            plural(*assets, "asset")
        )],
        PipelineEvent::ItemProcessed {
            index,
            kind,
            item_id,
            source,
            progress,
            warnings,
        } => {
            let mut lines = vec![
                format!("{}{} {} [{}]", indent(1), format_index(*index), item_id, kind),
                format!("{}Source: {}", indent(2), source.display()),
            ];
            lines.push(match progress {
                ItemProgress::Complete {
                    width,
                    height,
                    bytes,
                } => format!(
                    "{}small: {}x{}, {}",
                    indent(2),
                    width,
                    height,
                    format_bytes(*bytes)
                ),
                ItemProgress::DerivativeFailed(error) => {
                    format!("{}copied, small FAILED: {}", indent(2), error)
                }
                ItemProgress::Failed(error) => format!("{}FAILED: {}", indent(2), error),
            });
            for warning in warnings {
                lines.push(format!("{}warning: {}", indent(2), warning));
            }
            lines
        }
    }
}

// ============================================================================
// Run summary
// ============================================================================

/// Format the end-of-run summary: extracted metadata per page, totals, and
/// every failed item.
pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();

    let pages_with_photos: Vec<_> = summary
        .manifest
        .pages
        .iter()
        .filter(|(_, page)| !page.photos.is_empty())
        .collect();
    if !pages_with_photos.is_empty() {
        lines.push("Photos".to_string());
        for (page_id, page) in pages_with_photos {
            lines.push(page_id.clone());
            for (i, (photo_id, photo)) in page.photos.iter().enumerate() {
                lines.push(format!(
                    "{}{} {}: {}",
                    indent(1),
                    format_index(i + 1),
                    photo_id,
                    format_metadata(&photo.metadata())
                ));
            }
        }
        lines.push(String::new());
    }

    let failures = summary.failures();
    let warnings = summary.warnings();
    let mut totals = format!(
        "Processed {}, {}",
        plural(summary.count(ItemKind::Photo), "photo"),
        plural(summary.count(ItemKind::Asset), "asset")
    );
    if failures.is_empty() && warnings.is_empty() {
        totals.push_str(": all complete");
    } else {
        totals.push_str(&format!(
            ": {} failed, {}",
            failures.len(),
            plural(warnings.len(), "warning")
        ));
    }
    lines.push(totals);

    if !failures.is_empty() {
        lines.push(String::new());
        lines.push("Failed".to_string());
        for item in failures {
            let error = item
                .error()
                .map(ToString::to_string)
                .unwrap_or_default();
            lines.push(format!(
                "{}{}/{} [{}]: {}",
                indent(1),
                item.page_id,
                item.item_id,
                item.kind,
                error
            ));
        }
    }

    lines
}

pub fn print_event(event: &PipelineEvent) {
    for line in format_event(event) {
        println!("{}", line);
    }
}

pub fn print_summary(summary: &RunSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format a check report: one header per page, one line per problem.
pub fn format_check(report: &CheckReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, page) in report.pages.iter().enumerate() {
        match &page.location {
            Ok(dir) => {
                lines.push(format!(
                    "{} {}: {} in {}",
                    format_index(i + 1),
                    page.page_id,
                    plural(page.items, "item"),
                    dir.display()
                ));
                for missing in &page.missing {
                    lines.push(format!(
                        "{}missing {} {}: {}",
                        indent(1),
                        missing.kind,
                        missing.item_id,
                        missing.path.display()
                    ));
                }
            }
            Err(err) => lines.push(format!("{} {}: {}", format_index(i + 1), page.page_id, err)),
        }
    }

    match report.problems() {
        0 => lines.push("==> Manifest is valid".to_string()),
        n => lines.push(format!("==> {}", plural(n, "problem"))),
    }
    lines
}

pub fn print_check(report: &CheckReport) {
    for line in format_check(report) {
        println!("{}", line);
    }
}
