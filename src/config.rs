//! Site configuration module.
//!
//! Handles loading and validating `config.toml`. There is a single config file
//! per site; every value except `domain` has a default, so a minimal config is
//! one line:
//!
//! ```toml
//! domain = "cafedev.org"
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! domain = "cafedev.org"    # Required: host used for canonical links
//! protocol = "https"        # Scheme used for canonical links
//! title = "Cafe Dev"        # Site title shown in page headers
//! recent_count = 3          # Size of the "recent posts" widget
//!
//! [thumbnails]
//! index = "400x"            # Index-card thumbnail (WIDTHxHEIGHT, either side optional)
//! header = "1200x"          # Post header image
//! quality = 85              # JPEG quality for resized images (1-100)
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#1b1b1b"
//! text_muted = "#6b6b6b"
//! border = "#e4e4e4"
//! link = "#8a4b2a"
//! link_hover = "#5c2f17"
//!
//! [colors.dark]
//! background = "#141210"
//! text = "#ece8e3"
//! text_muted = "#9c958d"
//! border = "#34302c"
//! link = "#e0a77f"
//! link_hover = "#f5cdb0"
//!
//! [processing]
//! max_processes = 4         # Max parallel render workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! The loaded [`SiteConfig`] is passed explicitly to every stage that needs it;
//! nothing reads configuration from global state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::imaging::ThumbnailSize;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Host name used to build canonical URLs. Required.
    pub domain: String,
    /// URL scheme used to build canonical URLs.
    pub protocol: String,
    /// Site title shown in page headers and `<title>`.
    pub title: String,
    /// Number of posts shown in the "recent" widget and on the index page.
    pub recent_count: usize,
    /// Resized variants generated for each post's header image.
    pub thumbnails: ThumbnailsConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            protocol: "https".to_string(),
            title: "Cafe Dev".to_string(),
            recent_count: 3,
            thumbnails: ThumbnailsConfig::default(),
            colors: ColorConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain.trim().is_empty() {
            return Err(ConfigError::Validation("domain must be set".into()));
        }
        if self.domain.contains("://") || self.domain.ends_with('/') {
            return Err(ConfigError::Validation(
                "domain must be a bare host name, without scheme or trailing slash".into(),
            ));
        }
        if self.protocol.trim().is_empty() {
            return Err(ConfigError::Validation("protocol must not be empty".into()));
        }
        if self.thumbnails.quality == 0 || self.thumbnails.quality > 100 {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        for (name, token) in self.thumbnails.named_sizes() {
            if ThumbnailSize::parse(token).is_none() {
                return Err(ConfigError::Validation(format!(
                    "thumbnails.{name} must look like 400x, x300 or 400x300 (got {token:?})"
                )));
            }
        }
        Ok(())
    }

    /// `{protocol}://{domain}`, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Header image variants. Each value is a size token such as `"400x"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Thumbnail shown on index and tag cards.
    pub index: String,
    /// Full-width image at the top of a post.
    pub header: String,
    /// JPEG encoding quality for resized images.
    pub quality: u8,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            index: "400x".to_string(),
            header: "1200x".to_string(),
            quality: 85,
        }
    }
}

impl ThumbnailsConfig {
    /// Size tokens paired with their config key, in generation order.
    pub fn named_sizes(&self) -> [(&'static str, &str); 2] {
        [("index", &self.index), ("header", &self.header)]
    }

    /// Parsed sizes, skipping any token that fails to parse.
    ///
    /// [`SiteConfig::validate`] rejects bad tokens, so after loading this
    /// yields every configured size.
    pub fn sizes(&self) -> Vec<ThumbnailSize> {
        self.named_sizes()
            .iter()
            .filter_map(|(_, token)| ThumbnailSize::parse(token))
            .collect()
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel document render workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Dates, bylines, sidebar headings.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#1b1b1b".to_string(),
            text_muted: "#6b6b6b".to_string(),
            border: "#e4e4e4".to_string(),
            link: "#8a4b2a".to_string(),
            link_hover: "#5c2f17".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#141210".to_string(),
            text: "#ece8e3".to_string(),
            text_muted: "#9c958d".to_string(),
            border: "#34302c".to_string(),
            link: "#e0a77f".to_string(),
            link_hover: "#f5cdb0".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

/// Load and validate a config file.
///
/// A missing file is an error: `domain` has no default, so there is no usable
/// configuration without one.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate config from TOML text.
pub fn parse_config(content: &str) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# cafe-press configuration
# ========================
# Only `domain` is required. Values shown below are the defaults.
# Unknown keys will cause an error.

# Host name used to build canonical links, the sitemap and robots.txt.
domain = "example.org"

# URL scheme for canonical links.
protocol = "https"

# Site title shown in page headers.
title = "Cafe Dev"

# Number of posts shown on the index page and in the "recent" sidebar.
recent_count = 3

# ---------------------------------------------------------------------------
# Header image variants
# ---------------------------------------------------------------------------
# Each size is WIDTHxHEIGHT with either side optional: "400x" scales to
# 400px wide, "x300" to 300px tall, "400x300" crops to fill exactly.
# Images are never upscaled.
[thumbnails]
index = "400x"
header = "1200x"

# JPEG quality for resized images (1 = worst, 100 = best).
quality = 85

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#1b1b1b"
text_muted = "#6b6b6b"    # Dates, bylines, sidebar headings
border = "#e4e4e4"
link = "#8a4b2a"
link_hover = "#5c2f17"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#141210"
text = "#ece8e3"
text_muted = "#9c958d"
border = "#34302c"
link = "#e0a77f"
link_hover = "#f5cdb0"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-link-hover: {dark_link_hover};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
    )
}
