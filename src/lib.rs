//! # Gallery Prep
//!
//! The image build step of a static photo-gallery site. A hand-written
//! manifest names pages and the photos and assets on each; this crate turns it
//! into files a site generator can use directly.
//!
//! # Architecture: One Pass, Three Stages
//!
//! ```text
//! 1. Load       info.toml        →  Manifest            (decode, keep author order)
//! 2. Process    Manifest         →  public/photos/      (copies + .small derivatives)
//! 3. Serialize  enriched pages   →  src/info.json       (make, model, iso, ...)
//! ```
//!
//! Every run reprocesses everything. Re-running on unchanged input reproduces
//! the copies byte for byte and the metadata field for field.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Driver: stages, progress events, run summary, `check` |
//! | [`process`] | Item and page processors with per-item error isolation |
//! | [`manifest`] | Manifest decoding (TOML/JSON) and pretty JSON output |
//! | [`location`] | `local:<dir>` location parsing and source resolution |
//! | [`naming`] | Output file names: `<id><ext>` and `<stem>.small<ext>` |
//! | [`metadata`] | Camera metadata record, tag issues, shutter-speed display |
//! | [`imaging`] | Pure-Rust EXIF reading and size-bounded derivative encoding |
//! | [`config`] | Optional `gallery.toml` loading and validation |
//! | [`types`] | The manifest data model shared by input and output |
//! | [`output`] | CLI output formatting for progress, summaries, and checks |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Fatal vs. Per-Item Errors
//!
//! Problems with the manifest's structure stop the run: an undecodable
//! manifest, an unknown location scheme, an output directory that cannot be
//! created, or an output manifest that cannot be written. Problems with a
//! single file do not: a missing source, an undecodable image, or a failed
//! derivative is recorded against that item and the run moves on. The output
//! manifest is still written, and the CLI exits non-zero so automation notices.
//!
//! An unknown scheme aborts the whole run rather than just its page. It is
//! detected before the page's output directory is created, so the page leaves
//! nothing behind, but pages processed earlier keep their files.
//!
//! ## Enrichment as Data Flow
//!
//! Item processors return what they extracted instead of mutating the manifest
//! they were handed. [`process::process_page`] folds the results into a new
//! page snapshot, and the driver assembles the output manifest from those.
//!
//! ## Partial Metadata Is Fine
//!
//! A photo with no ISO tag still gets its make and model. Tags that exist but
//! cannot be read as the expected type are left absent and reported as
//! warnings. Only bytes that are not an image at all fail the photo.
//!
//! ## Pure-Rust Imaging
//!
//! EXIF comes from `kamadak-exif` and derivatives from the `image` crate, so
//! the binary needs no ImageMagick or exiftool on the build machine. The
//! [`imaging::ImageBackend`] trait keeps both behind one seam that tests mock.

pub mod config;
pub mod imaging;
pub mod location;
pub mod logging;
pub mod manifest;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
