//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides which variants to create) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1-100, default 85). Clamped on construction.
//! - [`ThumbnailSize`]: a configured size token such as `400x`, `x300` or `400x300`.
//! - [`ResizeParams`]: everything one resize needs, from source and output path to crop flag and quality.

use std::fmt;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// A requested output size. At least one side is always set.
///
/// Written as `WIDTHxHEIGHT` with either side optional. The token is also
/// what gets spliced into the output filename (`photo.400x.jpg`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ThumbnailSize {
    /// Parse a size token. Returns `None` for anything malformed, for `"x"`
    /// and for zero-sized sides.
    pub fn parse(token: &str) -> Option<Self> {
        let (w, h) = token.trim().split_once('x')?;
        let side = |s: &str| -> Option<Option<u32>> {
            if s.is_empty() {
                Some(None)
            } else if s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse::<u32>().ok().filter(|&v| v > 0).map(Some)
            } else {
                None
            }
        };
        let size = Self {
            width: side(w)?,
            height: side(h)?,
        };
        (size.width.is_some() || size.height.is_some()).then_some(size)
    }

    /// The canonical token, e.g. `"400x"`.
    pub fn token(&self) -> String {
        self.to_string()
    }

    /// Both sides fixed: the image is cropped to fill the box.
    pub fn is_crop(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

impl fmt::Display for ThumbnailSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(w) = self.width {
            write!(f, "{w}")?;
        }
        f.write_str("x")?;
        if let Some(h) = self.height {
            write!(f, "{h}")?;
        }
        Ok(())
    }
}

/// Parameters for a single resize operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Center-crop to exactly `width`×`height` instead of an aspect-preserving scale.
    pub crop: bool,
    pub quality: Quality,
}
