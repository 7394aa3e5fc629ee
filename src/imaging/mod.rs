//! Image handling in pure Rust, with no external tools.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **EXIF metadata** | `kamadak-exif` over in-memory bytes |
//! | **Derivative** | Lanczos3 resize + quality/size-bounded re-encode |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining naming + backend

pub mod backend;
pub mod calculations;
mod exif_reader;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Derivative, ImageBackend};
pub use operations::{create_derivative, extract_metadata};
pub use params::{DerivativeConstraints, DerivativeParams, Quality};
pub use rust_backend::RustBackend;
