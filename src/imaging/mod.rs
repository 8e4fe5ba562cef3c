//! Image processing for post media, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize** | Lanczos3 via `DynamicImage::resize_exact` |
//! | **Crop to fill** | `DynamicImage::resize_to_fill` |
//! | **Encode** | JPEG (with quality), PNG, GIF, chosen by output extension |
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
pub use calculations::calculate_target_dimensions;
pub use operations::{GeneratedVariant, create_variant};
pub use params::{Quality, ResizeParams, ThumbnailSize};
pub use rust_backend::RustBackend;
