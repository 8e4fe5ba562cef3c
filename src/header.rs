//! Metadata header parsing.
//!
//! Every content file starts with an HTML comment holding `key: value` lines,
//! followed by the markdown body:
//!
//! ```text
//! <!--
//! title: First post
//! author: jane.doe
//! date: 2020-05-02 10:30:00
//! description: Hello there
//! tags: rust,web
//! headerImg: cover.jpg
//! -->
//!
//! Markdown body starts here.
//! ```
//!
//! The comment keeps the metadata invisible to markdown renderers that see the
//! raw file. Only `author` is required at this level; date parsing and author
//! resolution happen in the catalog.

use std::collections::BTreeMap;
use thiserror::Error;

const OPEN: &str = "<!--";
const CLOSE: &str = "-->";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("malformed header: {0}")]
    Malformed(&'static str),
}

/// Header fields plus the markdown that follows the comment block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHeader {
    pub metadata: BTreeMap<String, String>,
    pub body: String,
}

/// Split a raw content file into metadata and body.
///
/// Each line is split at its first colon and both halves trimmed, so values
/// may themselves contain colons (`date: 2020-05-02 10:30:00`). Lines without
/// a colon, with an empty key or with whitespace inside the key are skipped.
/// A key repeated later in the block overwrites the earlier value.
pub fn parse_header(raw: &str) -> Result<ParsedHeader, HeaderError> {
    let rest = raw
        .trim_start()
        .strip_prefix(OPEN)
        .ok_or(HeaderError::Malformed("document must start with <!--"))?;
    let (block, body) = rest
        .split_once(CLOSE)
        .ok_or(HeaderError::Malformed("header comment is never closed"))?;

    let mut metadata = BTreeMap::new();
    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            continue;
        }
        metadata.insert(key.to_string(), value.trim().to_string());
    }

    if metadata.get("author").is_none_or(|a| a.is_empty()) {
        return Err(HeaderError::Malformed("header has no author"));
    }

    Ok(ParsedHeader {
        metadata,
        body: body.trim().to_string(),
    })
}

/// Write metadata back out as a header block, one `key: value` per line in
/// key order. [`parse_header`] reads the result back unchanged for any map
/// whose keys and values survive trimming and contain no newlines.
pub fn render_header(metadata: &BTreeMap<String, String>) -> String {
    let mut out = String::from(OPEN);
    out.push('\n');
    for (key, value) in metadata {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out.push_str(CLOSE);
    out.push('\n');
    out
}
