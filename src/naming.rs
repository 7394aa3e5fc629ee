//! Output filename conventions.
//!
//! Every item in the manifest lands on disk under its identifier, not its
//! source filename. The source only contributes its extension:
//!
//! ```text
//! photos.dawn   src = "raw/IMG_0042.JPG"   →  dawn.JPG
//!                                          →  dawn.small.JPG
//! assets.cover  src = "cover.png"          →  assets/cover.png
//!                                          →  assets/cover.small.png
//! ```
//!
//! Extensions are carried over verbatim (case included) so a site generator
//! can reconstruct both names from the manifest alone.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Marker inserted between stem and extension for derivative images.
pub const DERIVATIVE_MARKER: &str = "small";

/// Extension of `src` including the leading dot, or an empty string.
///
/// - `"a/b/photo.jpg"` → `".jpg"`
/// - `"photo.tar.gz"` → `".gz"`
/// - `"README"` → `""`
/// - `"photo."` → `""`
pub fn source_extension(src: &str) -> String {
    Path::new(src)
        .extension()
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Output filename for an item: `<id><ext>`, with the extension taken from `src`.
pub fn item_filename(id: &str, src: &str) -> String {
    format!("{}{}", id, source_extension(src))
}

/// Derivative path for a full-size copy: `<stem>.small<ext>` beside it.
///
/// An extension-less `path` yields `<name>.small`.
pub fn derivative_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().map(OsString::from).unwrap_or_default();

    let mut name = stem;
    name.push(".");
    name.push(DERIVATIVE_MARKER);
    if let Some(ext) = path.extension().filter(|ext| !ext.is_empty()) {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}
