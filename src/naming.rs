//! Slug and filename conventions.
//!
//! Every URL the site produces is built from a slug: posts use the content
//! file stem, tag pages use a slugified tag name. Resized images keep their
//! source name with the size token spliced in before the extension.
//!
//! ```text
//! "Rust in Production!"   →  rust-in-production
//! first-post.md           →  slug "first-post"
//! cover.JPG + "400x"      →  cover.400x.jpg
//! ```

/// A slug is non-empty and made of `a-z`, `0-9`, `_` and `-` only.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

/// Turn a free-form title into a slug.
///
/// Trims, lowercases, collapses each whitespace run into a single `-`, then
/// drops every character that is not a slug character. May return an empty
/// string for titles with no ASCII letters or digits.
pub fn title_to_slug(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

/// Name of a resized sibling: the size token goes before the lowercased
/// extension.
///
/// - `"photo.jpg"`, `"400x"` → `"photo.400x.jpg"`
/// - `"Cover.PNG"`, `"1200x"` → `"Cover.1200x.png"`
/// - `"noext"`, `"400x"` → `"noext.400x"`
pub fn sized_filename(filename: &str, token: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            format!("{stem}.{token}.{}", ext.to_lowercase())
        }
        _ => format!("{filename}.{token}"),
    }
}
