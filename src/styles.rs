//! Stylesheet compilation and theme assets.
//!
//! The site stylesheet is the color custom properties generated from
//! `config.toml` followed by the theme's `style.css`. A site without a theme
//! gets the base stylesheet embedded in the binary.
//!
//! ```text
//! theme/
//! ├── style.css         # → build/static/style.css (after the color block)
//! └── static/           # → build/static/ (fonts, icons, scripts; tree kept)
//!     └── fonts/serif.woff2
//! ```

use crate::config::{ColorConfig, generate_color_css};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const BASE_CSS: &str = include_str!("../static/style.css");

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read theme stylesheet {}", .path.display())]
    Stylesheet {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Build the final stylesheet text.
pub fn compile_styles(theme_dir: &Path, colors: &ColorConfig) -> Result<String, StyleError> {
    let theme_css = theme_dir.join("style.css");
    let body = if theme_css.is_file() {
        fs::read_to_string(&theme_css).map_err(|source| StyleError::Stylesheet {
            path: theme_css.clone(),
            source,
        })?
    } else {
        BASE_CSS.to_string()
    };
    Ok(format!("{}\n\n{}", generate_color_css(colors), body))
}

/// Copy everything under `theme/static/` into `dest`, keeping the tree.
///
/// Returns the number of files copied. A theme without a `static/` directory
/// copies nothing.
pub fn copy_theme_assets(theme_dir: &Path, dest: &Path) -> Result<usize, StyleError> {
    let src = theme_dir.join("static");
    if !src.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(&src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let rel = entry.path().strip_prefix(&src).unwrap_or(entry.path());
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
