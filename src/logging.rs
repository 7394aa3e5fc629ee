//! Logging initialization.
//!
//! Diagnostics go through `tracing` to stderr; stdout carries the progress
//! and summary lines from [`output`](crate::output). `RUST_LOG` overrides the
//! level chosen here.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset.
///
/// Quiet by default: per-item failures are already printed by the CLI, so
/// only warnings (uncoercible tags, failed items) reach the log.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "gallery_prep=debug,info" } else { "warn" }
}

/// Initialize the logging subsystem.
///
/// * `verbose` - debug level for this crate instead of warnings only.
/// * `json_format` - structured JSON lines instead of human-readable output.
pub fn init(verbose: bool, json_format: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
