//! Data model shared by the catalog, the renderer and media transfer.

use crate::authors::AuthorRecord;
use crate::date::PostDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One tag as written in a post header, with the URL of its tag page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagLink {
    pub name: String,
    pub link: String,
}

/// A post loaded from the content directory.
///
/// Paths and links are computed once when the catalog is built; nothing
/// downstream reformats them.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Content file stem; also the last URL segment.
    pub slug: String,
    /// Every header field, verbatim. `date` keeps any time component.
    pub metadata: BTreeMap<String, String>,
    #[serde(skip)]
    pub date: PostDate,
    /// `YYYYMMDD{slug}`; the catalog orders by this, newest first.
    pub sort_key: String,
    /// Header tags in written order, duplicates included.
    pub tags: Vec<TagLink>,
    /// Markdown after the header, trimmed.
    pub body: String,
    pub author: AuthorRecord,
    /// `{output}/article/{yyyy}/{mm}/{slug}`
    pub output_dir: PathBuf,
    /// `{protocol}://{domain}/article/{yyyy}/{mm}/{slug}`
    pub link: String,
    /// `{content}/{slug}`; holds the post's images when it exists.
    pub asset_dir: PathBuf,
}

impl Document {
    fn field(&self, key: &str) -> &str {
        self.metadata.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn title(&self) -> &str {
        self.field("title")
    }

    pub fn description(&self) -> &str {
        self.field("description")
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.metadata
            .get("subtitle")
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// File name of the header image inside [`asset_dir`](Self::asset_dir).
    pub fn header_image(&self) -> Option<&str> {
        self.metadata
            .get("headerImg")
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}
