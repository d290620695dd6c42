//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize** | `image::DynamicImage::resize_exact` (Lanczos3) |
//! | **Encode AVIF** | `image::codecs::avif::AvifEncoder` (rav1e) |
//! | **Encode JPEG / PNG** | `image::codecs::{jpeg, png}` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{PlannedVariant, VariantConfig, get_dimensions, plan_variants};
pub use params::{OutputFormat, Quality, ResizeParams};
pub use rust_backend::RustBackend;
