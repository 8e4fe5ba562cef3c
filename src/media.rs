//! Per-post image transfer.
//!
//! Copies the images in a post's asset directory next to its rendered page
//! and creates the resized variants of its header image:
//!
//! ```text
//! content/first-post/              build/article/2020/05/first-post/
//! ├── cover.jpg          ──copy──▶ ├── cover.jpg
//! ├── diagram.png        ──copy──▶ ├── diagram.png
//! └── notes.txt          (skipped) ├── cover.400x.jpg    (index thumbnail)
//!                                  ├── cover.1200x.jpg   (article header)
//!                                  └── index.html
//! ```
//!
//! Only `headerImg` gets variants; other images are copied as-is. Failures
//! are returned to the caller, which logs them and keeps building: a missing
//! image never takes the site down.

use crate::config::ThumbnailsConfig;
use crate::imaging::{
    BackendError, GeneratedVariant, ImageBackend, Quality, ThumbnailSize, create_variant,
};
use crate::types::Document;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extensions (lowercase) treated as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("failed to copy {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to resize {}", .path.display())]
    Resize {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

impl MediaError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Resize { path, .. } => path,
        }
    }
}

/// What one post's transfer produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// File names copied into the output directory, in name order.
    pub copied: Vec<String>,
    pub variants: Vec<GeneratedVariant>,
}

pub struct MediaTransfer<'a> {
    backend: &'a dyn ImageBackend,
    sizes: Vec<ThumbnailSize>,
    quality: Quality,
}

impl<'a> MediaTransfer<'a> {
    pub fn new(backend: &'a dyn ImageBackend, sizes: Vec<ThumbnailSize>, quality: Quality) -> Self {
        Self {
            backend,
            sizes,
            quality,
        }
    }

    pub fn from_config(backend: &'a dyn ImageBackend, thumbnails: &ThumbnailsConfig) -> Self {
        Self::new(
            backend,
            thumbnails.sizes(),
            Quality::new(thumbnails.quality.into()),
        )
    }

    /// Copy a post's images and resize its header image.
    pub fn transfer_images(&self, document: &Document) -> Result<TransferReport, MediaError> {
        let images = find_images(&document.asset_dir)?;
        let mut report = TransferReport::default();
        if images.is_empty() {
            return Ok(report);
        }

        let out = &document.output_dir;
        fs::create_dir_all(out).map_err(|source| MediaError::Io {
            path: out.clone(),
            source,
        })?;

        for source in &images {
            let Some(name) = source.file_name() else {
                continue;
            };
            fs::copy(source, out.join(name)).map_err(|err| MediaError::Io {
                path: source.clone(),
                source: err,
            })?;
            report.copied.push(name.to_string_lossy().into_owned());
        }

        match document.header_image() {
            Some(header) if report.copied.iter().any(|c| c == header) => {
                let copied = out.join(header);
                for &size in &self.sizes {
                    let variant = create_variant(self.backend, &copied, out, size, self.quality)
                        .map_err(|source| MediaError::Resize {
                            path: copied.clone(),
                            source,
                        })?;
                    debug!(slug = %document.slug, file = %variant.filename, "created variant");
                    report.variants.push(variant);
                }
            }
            Some(header) => {
                warn!(slug = %document.slug, header, "header image not found in asset directory");
            }
            None => {}
        }

        Ok(report)
    }
}

/// Whether the document's `headerImg` is an image file directly inside its
/// asset directory, i.e. whether a transfer will try to resize it.
pub fn has_header_source(document: &Document) -> bool {
    let Some(header) = document.header_image() else {
        return false;
    };
    let path = document.asset_dir.join(header);
    path.file_name().is_some_and(|name| name == header)
        && path.is_file()
        && is_image(&path)
}

/// Image files directly inside `dir`, sorted by name. A missing directory
/// has no images.
pub fn find_images(dir: &Path) -> Result<Vec<PathBuf>, MediaError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| MediaError::Io {
            path: dir.to_path_buf(),
            source: err.into(),
        })?;
        if entry.file_type().is_file() && is_image(entry.path()) {
            images.push(entry.into_path());
        }
    }
    Ok(images)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}
