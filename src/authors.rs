//! Author table loaded from `authors.json`.
//!
//! The file is a JSON object keyed by the id used in post headers:
//!
//! ```json
//! {
//!   "jane.doe": { "name": "Jane Doe", "url": "https://jane.example" },
//!   "sam":      { "name": "Sam" }
//! }
//! ```
//!
//! `name` is required; every other string field is kept in
//! [`AuthorRecord::extra`] for templates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthorsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub name: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// All known authors, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorTable {
    authors: BTreeMap<String, AuthorRecord>,
}

impl AuthorTable {
    pub fn get(&self, id: &str) -> Option<&AuthorRecord> {
        self.authors.get(id)
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    pub fn insert(&mut self, id: impl Into<String>, record: AuthorRecord) {
        self.authors.insert(id.into(), record);
    }
}

impl FromIterator<(String, AuthorRecord)> for AuthorTable {
    fn from_iter<I: IntoIterator<Item = (String, AuthorRecord)>>(iter: I) -> Self {
        Self {
            authors: iter.into_iter().collect(),
        }
    }
}

pub fn load_authors(path: &Path) -> Result<AuthorTable, AuthorsError> {
    let content = std::fs::read_to_string(path)?;
    parse_authors(&content)
}

pub fn parse_authors(content: &str) -> Result<AuthorTable, AuthorsError> {
    Ok(serde_json::from_str(content)?)
}
