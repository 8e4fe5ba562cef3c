//! New post scaffolding.
//!
//! Writes `content/{slug}.md` containing only a metadata header, ready for
//! the body to be filled in:
//!
//! ```text
//! $ cafe-press new --title "Hello World" --author jane --description "First" --tags rust,web
//!
//! content/hello-world.md
//! <!--
//! author: jane
//! date: 2024-03-09 14:05:00
//! description: First
//! tags: rust,web
//! title: Hello World
//! -->
//! ```

use crate::authors::AuthorTable;
use crate::date::parse_date;
use crate::header::render_header;
use crate::naming::{is_valid_slug, title_to_slug};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid {field}: {value:?} ({expected})")]
    Invalid {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("unknown author {0:?}")]
    UnknownAuthor(String),
    #[error("{} already exists", .0.display())]
    Exists(PathBuf),
}

/// Fields for a new post. `slug` defaults to the slugified title, `date` to
/// the current local time.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub slug: Option<String>,
    pub author: String,
    pub description: String,
    pub date: Option<String>,
    pub tags: Option<String>,
}

impl NewPost {
    pub fn slug(&self) -> String {
        self.slug
            .clone()
            .unwrap_or_else(|| title_to_slug(&self.title))
    }

    /// Check every field and return the header metadata to write.
    pub fn metadata(&self, authors: &AuthorTable) -> Result<BTreeMap<String, String>, ScaffoldError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(invalid("title", title, "must not be empty"));
        }
        let slug = self.slug();
        if !is_valid_slug(&slug) {
            return Err(invalid("slug", &slug, "lowercase letters, digits, '-' and '_'"));
        }
        if !is_valid_author_id(&self.author) {
            return Err(invalid("author", &self.author, "lowercase letters and '.'"));
        }
        if authors.get(&self.author).is_none() {
            return Err(ScaffoldError::UnknownAuthor(self.author.clone()));
        }

        let date = match &self.date {
            Some(date) => {
                if !is_valid_timestamp(date) || parse_date(date).is_err() {
                    return Err(invalid("date", date, "YYYY-MM-DD HH:MM:SS"));
                }
                date.clone()
            }
            None => chrono::Local::now().format(DATE_FORMAT).to_string(),
        };

        let mut metadata = BTreeMap::new();
        metadata.insert("title".to_string(), title.to_string());
        metadata.insert("author".to_string(), self.author.clone());
        metadata.insert("date".to_string(), date);
        metadata.insert("description".to_string(), self.description.trim().to_string());

        if let Some(tags) = &self.tags {
            if !is_valid_tag_list(tags) {
                return Err(invalid("tags", tags, "comma separated words, no spaces"));
            }
            metadata.insert("tags".to_string(), tags.clone());
        }

        Ok(metadata)
    }
}

/// Write the new post into `content_dir`. Never overwrites an existing file.
pub fn create_post(
    content_dir: &Path,
    post: &NewPost,
    authors: &AuthorTable,
) -> Result<PathBuf, ScaffoldError> {
    let metadata = post.metadata(authors)?;
    fs::create_dir_all(content_dir)?;
    let path = content_dir.join(format!("{}.md", post.slug()));

    let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(ScaffoldError::Exists(path));
        }
        Err(err) => return Err(err.into()),
    };
    file.write_all(render_header(&metadata).as_bytes())?;
    Ok(path)
}

fn invalid(field: &'static str, value: &str, expected: &'static str) -> ScaffoldError {
    ScaffoldError::Invalid {
        field,
        value: value.to_string(),
        expected,
    }
}

fn is_valid_author_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_lowercase() || c == '.')
}

/// `word(,word)*` where a word is ASCII letters, digits and `_`.
fn is_valid_tag_list(tags: &str) -> bool {
    tags.split(',').all(|tag| {
        !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// `YYYY-MM-DD H:MM:SS`, hour with one or two digits.
fn is_valid_timestamp(value: &str) -> bool {
    let Some((date, time)) = value.split_once(' ') else {
        return false;
    };
    let digits = |s: &str, range: std::ops::RangeInclusive<usize>| {
        range.contains(&s.len()) && s.chars().all(|c| c.is_ascii_digit())
    };

    let date: Vec<&str> = date.split('-').collect();
    let time: Vec<&str> = time.split(':').collect();
    matches!(date.as_slice(), [y, m, d] if digits(y, 4..=4) && digits(m, 2..=2) && digits(d, 2..=2))
        && matches!(time.as_slice(), [h, m, s] if digits(h, 1..=2) && digits(m, 2..=2) && digits(s, 2..=2))
}
