//! Shared test utilities for the cafe-press test suite.
//!
//! Writes content files and author tables into temp directories and builds
//! the config and documents most tests start from.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_post(tmp.path(), "first-post", "2020-05-02", "rust,web");
//! let catalog = load_catalog(tmp.path(), &sample_authors(), &site_config(), out).unwrap();
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use crate::authors::{AuthorRecord, AuthorTable};
use crate::config::SiteConfig;
use crate::date::{parse_date, sort_key};
use crate::header::render_header;
use crate::types::{Document, TagLink};

// =========================================================================
// Site setup
// =========================================================================

/// Config for `https://cafedev.org` with everything else at defaults.
pub fn site_config() -> SiteConfig {
    SiteConfig {
        domain: "cafedev.org".to_string(),
        ..SiteConfig::default()
    }
}

/// Two authors: `jane` (Jane Doe) and `sam.k` (Sam K).
pub fn sample_authors() -> AuthorTable {
    [("jane", "Jane Doe"), ("sam.k", "Sam K")]
        .into_iter()
        .map(|(id, name)| {
            (
                id.to_string(),
                AuthorRecord {
                    name: name.to_string(),
                    extra: BTreeMap::new(),
                },
            )
        })
        .collect()
}

// =========================================================================
// Content files
// =========================================================================

/// Write `{slug}.md` with the given header fields and body.
pub fn write_raw_post(dir: &Path, slug: &str, fields: &[(&str, &str)], body: &str) {
    let metadata: BTreeMap<String, String> = fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let content = format!("{}\n{}\n", render_header(&metadata), body);
    std::fs::write(dir.join(format!("{slug}.md")), content).unwrap();
}

/// Write a complete post by `jane` titled `Post {slug}`.
///
/// `tags` is the raw header value; pass `""` for an untagged post.
pub fn write_post(dir: &Path, slug: &str, date: &str, tags: &str) {
    let title = format!("Post {slug}");
    let mut fields = vec![
        ("title", title.as_str()),
        ("author", "jane"),
        ("date", date),
        ("description", "A test post"),
    ];
    if !tags.is_empty() {
        fields.push(("tags", tags));
    }
    write_raw_post(dir, slug, &fields, &format!("# Heading\n\nBody of {slug}."));
}

/// Write a small gradient JPEG.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

// =========================================================================
// In-memory documents
// =========================================================================

/// A document as the catalog would build it, without touching disk.
pub fn document(slug: &str, date: &str, tags: &[&str], out: &Path, content: &Path) -> Document {
    let config = site_config();
    let date = parse_date(date).unwrap();
    let year = format!("{:04}", date.year);
    let month = format!("{:02}", date.month);

    let mut metadata = BTreeMap::new();
    metadata.insert("title".to_string(), format!("Post {slug}"));
    metadata.insert("author".to_string(), "jane".to_string());
    metadata.insert("date".to_string(), date.iso());
    metadata.insert("description".to_string(), "A test post".to_string());
    if !tags.is_empty() {
        metadata.insert("tags".to_string(), tags.join(","));
    }

    Document {
        slug: slug.to_string(),
        sort_key: sort_key(&date, slug),
        tags: tags
            .iter()
            .map(|t| TagLink {
                name: t.to_string(),
                link: format!("{}/tag/{t}", config.base_url()),
            })
            .collect(),
        body: format!("Body of {slug}."),
        author: AuthorRecord {
            name: "Jane Doe".to_string(),
            extra: BTreeMap::new(),
        },
        output_dir: out.join("article").join(&year).join(&month).join(slug),
        link: format!("{}/article/{year}/{month}/{slug}", config.base_url()),
        asset_dir: content.join(slug),
        metadata,
        date,
    }
}
