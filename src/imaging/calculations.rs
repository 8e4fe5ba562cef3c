//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::ThumbnailSize;

/// Calculate output dimensions for a requested size.
///
/// - Width only: scale to that width, preserving aspect ratio.
/// - Height only: scale to that height, preserving aspect ratio.
/// - Both: the exact crop box.
///
/// Images are never upscaled. A single-side request larger than the original
/// returns the original dimensions; a crop box that does not fit is shrunk,
/// keeping its own aspect ratio, until it does.
///
/// # Examples
/// ```
/// # use cafe_press::imaging::{ThumbnailSize, calculate_target_dimensions};
/// let size = ThumbnailSize::parse("400x").unwrap();
/// assert_eq!(calculate_target_dimensions((1600, 1200), size), (400, 300));
/// ```
pub fn calculate_target_dimensions(original: (u32, u32), size: ThumbnailSize) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    if orig_w == 0 || orig_h == 0 {
        return original;
    }

    match (size.width, size.height) {
        (Some(w), Some(h)) => {
            let factor = (orig_w as f64 / w as f64)
                .min(orig_h as f64 / h as f64)
                .min(1.0);
            (
                ((w as f64 * factor).round() as u32).max(1),
                ((h as f64 * factor).round() as u32).max(1),
            )
        }
        (Some(w), None) => {
            if w >= orig_w {
                return original;
            }
            let h = (orig_h as f64 * w as f64 / orig_w as f64).round() as u32;
            (w, h.max(1))
        }
        (None, Some(h)) => {
            if h >= orig_h {
                return original;
            }
            let w = (orig_w as f64 * h as f64 / orig_h as f64).round() as u32;
            (w.max(1), h)
        }
        (None, None) => original,
    }
}
