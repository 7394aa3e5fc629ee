//! Build configuration.
//!
//! An optional `gallery.toml` next to the manifest controls where things are
//! read from and written to, and how derivatives are sized. Without one, the
//! stock defaults reproduce the conventional layout:
//!
//! ```text
//! info.toml          →  manifest (input)
//! public/photos/     →  copies + derivatives, one directory per page
//! src/info.json      →  enriched manifest (output)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! manifest = "info.toml"
//! output_root = "public/photos"
//! manifest_output = "src/info.json"
//!
//! [derivatives]
//! max_dimension = 2000      # Longest edge, pixels
//! max_bytes = 1048576       # File size ceiling (1 MiB)
//! quality = 85              # Starting JPEG quality (1-100)
//! min_quality = 40          # Lowest JPEG quality tried before shrinking
//! quality_step = 5          # Quality decrement per attempt
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::{DerivativeConstraints, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Build configuration loaded from `gallery.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Input manifest (TOML, or JSON for re-running on an output manifest).
    pub manifest: PathBuf,
    /// Root of the per-page output directories.
    pub output_root: PathBuf,
    /// Where the enriched JSON manifest is written.
    pub manifest_output: PathBuf,
    /// Derivative size budget.
    pub derivatives: DerivativesConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("info.toml"),
            output_root: PathBuf::from("public/photos"),
            manifest_output: PathBuf::from("src/info.json"),
            derivatives: DerivativesConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.derivatives.validate()
    }

    /// Rebase every relative path onto `root`. Absolute paths are left alone.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        for path in [
            &mut self.manifest,
            &mut self.output_root,
            &mut self.manifest_output,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        self
    }
}

/// Derivative generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DerivativesConfig {
    /// Longest edge of a derivative, in pixels.
    pub max_dimension: u32,
    /// Maximum derivative file size, in bytes.
    pub max_bytes: u64,
    /// Starting JPEG quality (1-100).
    pub quality: u32,
    /// Lowest JPEG quality tried before dimensions are reduced further.
    pub min_quality: u32,
    /// Quality decrement between attempts.
    pub quality_step: u32,
}

impl Default for DerivativesConfig {
    fn default() -> Self {
        Self {
            max_dimension: 2000,
            max_bytes: 1024 * 1024,
            quality: 85,
            min_quality: 40,
            quality_step: 5,
        }
    }
}

impl DerivativesConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "derivatives.max_dimension must be non-zero".into(),
            ));
        }
        if self.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "derivatives.max_bytes must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.quality) || !(1..=100).contains(&self.min_quality) {
            return Err(ConfigError::Validation(
                "derivatives.quality and derivatives.min_quality must be 1-100".into(),
            ));
        }
        if self.min_quality > self.quality {
            return Err(ConfigError::Validation(
                "derivatives.min_quality must not exceed derivatives.quality".into(),
            ));
        }
        if self.quality_step == 0 {
            return Err(ConfigError::Validation(
                "derivatives.quality_step must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Constraints handed to the derivative generator.
    pub fn constraints(&self) -> DerivativeConstraints {
        DerivativeConstraints {
            max_dimension: self.max_dimension,
            max_bytes: self.max_bytes,
            quality: Quality::new(self.quality),
            min_quality: Quality::new(self.min_quality),
            quality_step: self.quality_step,
        }
    }
}

/// Load config from `path`, falling back to defaults when it does not exist.
///
/// User values override defaults key by key, unknown keys are rejected, and
/// the result is validated. Relative paths are rebased onto the directory
/// `path` lives in, whether or not the file exists.
pub fn load_config(path: &Path) -> Result<BuildConfig, ConfigError> {
    if !path.exists() {
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        return Ok(BuildConfig::default().rooted_at(base));
    }
    load_config_file(path)
}

/// Load config from `path`, which must exist.
pub fn load_config_file(path: &Path) -> Result<BuildConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let content = fs::read_to_string(path)?;
    let config: BuildConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config.rooted_at(base))
}

/// Config for a CLI invocation: a file named with `--config` must exist,
/// while the default [`DEFAULT_CONFIG_FILE`] is optional.
pub fn load_cli_config(explicit: Option<&Path>) -> Result<BuildConfig, ConfigError> {
    match explicit {
        Some(path) => load_config_file(path),
        None => load_config(Path::new(DEFAULT_CONFIG_FILE)),
    }
}

/// Returns a fully-commented stock `gallery.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gallery-prep configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Relative paths are resolved against
# the directory containing this file. Unknown keys will cause an error.

# Input manifest. TOML, or JSON to re-run on a previously written output.
manifest = "info.toml"

# Copies and derivatives land in <output_root>/<page_id>/.
output_root = "public/photos"

# Enriched manifest for the site generator.
manifest_output = "src/info.json"

# ---------------------------------------------------------------------------
# Derivatives (<id>.small<ext>)
# ---------------------------------------------------------------------------
[derivatives]
# Longest edge in pixels. Smaller images are never upscaled.
max_dimension = 2000

# File size ceiling in bytes (1 MiB).
max_bytes = 1048576

# JPEG quality is stepped down from `quality` to `min_quality` until the file
# fits; after that the image is shrunk further. PNG, TIFF, and WebP outputs
# are lossless and only shrink.
quality = 85
min_quality = 40
quality_step = 5
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_paths() {
        let config = BuildConfig::default();
        assert_eq!(config.manifest, PathBuf::from("info.toml"));
        assert_eq!(config.output_root, PathBuf::from("public/photos"));
        assert_eq!(config.manifest_output, PathBuf::from("src/info.json"));
    }

    #[test]
    fn default_derivative_budget() {
        let c = BuildConfig::default().derivatives.constraints();
        assert_eq!(c.max_dimension, 2000);
        assert_eq!(c.max_bytes, 1_048_576);
        assert_eq!(c.quality.value(), 85);
        assert_eq!(c.min_quality.value(), 40);
        assert_eq!(c.quality_step, 5);
    }

    #[test]
    fn parse_partial_config() {
        let config: BuildConfig = toml::from_str(
            r#"
output_root = "dist/photos"

[derivatives]
max_dimension = 1600
"#,
        )
        .unwrap();
        assert_eq!(config.output_root, PathBuf::from("dist/photos"));
        assert_eq!(config.derivatives.max_dimension, 1600);
        // Unspecified defaults preserved
        assert_eq!(config.manifest, PathBuf::from("info.toml"));
        assert_eq!(config.derivatives.max_bytes, 1_048_576);
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: BuildConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<BuildConfig, _> = toml::from_str("manifset = \"x.toml\"");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<BuildConfig, _> = toml::from_str("[derivatives]\nmax_width = 10");
        assert!(result.is_err());
    }

    #[test]
    fn rooted_at_rebases_relative_paths() {
        let config = BuildConfig {
            manifest_output: PathBuf::from("/abs/info.json"),
            ..Default::default()
        }
        .rooted_at(Path::new("/site"));

        assert_eq!(config.manifest, PathBuf::from("/site/info.toml"));
        assert_eq!(config.output_root, PathBuf::from("/site/public/photos"));
        assert_eq!(config.manifest_output, PathBuf::from("/abs/info.json"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config, BuildConfig::default().rooted_at(tmp.path()));
        assert_eq!(config.manifest, tmp.path().join("info.toml"));
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "[derivatives]\nquality = 70\nmin_quality = 30\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.output_root, tmp.path().join("public/photos"));
        assert_eq!(config.derivatives.quality, 70);
        assert_eq!(config.derivatives.min_quality, 30);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "this is not valid toml [[[").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "[derivatives]\nmax_bytes = 0\n").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn explicit_missing_config_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("galery.toml");

        let result = load_cli_config(Some(&path));
        assert!(matches!(result, Err(ConfigError::NotFound(p)) if p == path));
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        fs::write(&path, "output_root = \"dist\"\n").unwrap();

        let config = load_cli_config(Some(&path)).unwrap();
        assert_eq!(config.output_root, tmp.path().join("dist"));
    }

    #[test]
    fn load_config_file_rejects_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            load_config_file(tmp.path()),
            Err(ConfigError::NotFound(_))
        ));
    }

    // =========================================================================
    // validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(BuildConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_zero_dimension() {
        let config = DerivativesConfig {
            max_dimension: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_quality_out_of_range() {
        let config = DerivativesConfig {
            quality: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DerivativesConfig {
            min_quality: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_min_quality_above_quality() {
        let config = DerivativesConfig {
            quality: 50,
            min_quality: 60,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_quality_step() {
        let config = DerivativesConfig {
            quality_step: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
