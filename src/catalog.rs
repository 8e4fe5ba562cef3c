//! Content catalog: every post, newest first, plus tag buckets.
//!
//! Posts are the `*.md` files directly inside the content directory. A post's
//! images live in a sibling directory named after its slug:
//!
//! ```text
//! content/
//! ├── first-post.md        # slug "first-post"
//! ├── first-post/          # asset dir (optional)
//! │   └── cover.jpg
//! └── second-post.md
//! ```
//!
//! Loading is all-or-nothing: the first file with a malformed header, a bad
//! date, an unknown author or an unusable slug aborts the whole load, so the
//! renderer never sees a partial catalog. Files are read in name order, which
//! makes that first error the same on every run.
//!
//! ## Ordering
//!
//! [`Catalog::documents`] is sorted by [`sort_key`](crate::date::sort_key)
//! descending. Keys embed the slug, and slugs are unique, so the order is
//! total. Each tag bucket holds indices into `documents` in that same order.

use crate::authors::AuthorTable;
use crate::config::SiteConfig;
use crate::date::{self, DateError, PostDate};
use crate::header::{self, HeaderError};
use crate::naming::{is_valid_slug, title_to_slug};
use crate::types::{Document, TagLink};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed header in {}", .path.display())]
    Header {
        path: PathBuf,
        #[source]
        source: HeaderError,
    },
    #[error("bad date in {}", .path.display())]
    Date {
        path: PathBuf,
        #[source]
        source: DateError,
    },
    #[error("unknown author {author:?} in {}", .path.display())]
    UnknownAuthor { path: PathBuf, author: String },
    #[error("invalid slug {slug:?} from {}: use lowercase letters, digits, '-' and '_'", .path.display())]
    InvalidSlug { path: PathBuf, slug: String },
    #[error("duplicate slug {slug:?}: {} and {}", .first.display(), .second.display())]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// One tag page: every tag name whose slug is `slug`, and their documents.
///
/// Names that differ only in case or punctuation (`Rust` and `rust`, `C` and
/// `C++`) link to the same URL, so they share one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPage {
    pub slug: String,
    /// In name order.
    pub names: Vec<String>,
    /// Indices into [`Catalog::documents`], in catalog order, each once.
    pub documents: Vec<usize>,
}

impl TagPage {
    /// Heading for the page: the names joined with `, `.
    pub fn title(&self) -> String {
        self.names.join(", ")
    }
}

/// All posts of a site, newest first.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub documents: Vec<Document>,
    /// Tag name → indices into `documents`, in catalog order.
    pub tags: BTreeMap<String, Vec<usize>>,
}

impl Catalog {
    /// Build a catalog from unordered documents.
    ///
    /// Sorts by sort key descending and computes tag buckets in one pass.
    /// A document carrying the same tag twice lands in that bucket once.
    pub fn from_documents(mut documents: Vec<Document>) -> Self {
        documents.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));

        let mut tags: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (index, doc) in documents.iter().enumerate() {
            let distinct: BTreeSet<&str> = doc.tags.iter().map(|t| t.name.as_str()).collect();
            for name in distinct {
                tags.entry(name.to_string()).or_default().push(index);
            }
        }

        Self { documents, tags }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The `n` newest documents (fewer if the catalog is smaller).
    pub fn recent(&self, n: usize) -> &[Document] {
        &self.documents[..n.min(self.documents.len())]
    }

    /// Documents carrying `name`, newest first. Empty for unknown tags.
    pub fn tag_documents<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Document> + use<'a> {
        self.tags
            .get(name)
            .into_iter()
            .flatten()
            .map(|&i| &self.documents[i])
    }

    /// One page per distinct tag slug, in slug order. Buckets of names that
    /// share a slug are merged, keeping catalog order.
    pub fn tag_pages(&self) -> Vec<TagPage> {
        let mut pages: BTreeMap<String, (Vec<String>, BTreeSet<usize>)> = BTreeMap::new();
        for (name, bucket) in &self.tags {
            let slug = title_to_slug(name);
            if slug.is_empty() {
                continue;
            }
            let (names, documents) = pages.entry(slug).or_default();
            names.push(name.clone());
            documents.extend(bucket.iter().copied());
        }

        pages
            .into_iter()
            .map(|(slug, (names, documents))| TagPage {
                slug,
                names,
                documents: documents.into_iter().collect(),
            })
            .collect()
    }

    pub fn page_documents<'a>(
        &'a self,
        page: &'a TagPage,
    ) -> impl Iterator<Item = &'a Document> + use<'a> {
        page.documents.iter().map(|&i| &self.documents[i])
    }

    /// Date of the newest document.
    pub fn newest_date(&self) -> Option<PostDate> {
        self.documents.first().map(|d| d.date)
    }

    pub fn find(&self, slug: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.slug == slug)
    }
}

/// URL of a tag page, or `None` when the tag has no usable slug.
pub fn tag_link(config: &SiteConfig, name: &str) -> Option<String> {
    let slug = title_to_slug(name);
    (!slug.is_empty()).then(|| format!("{}/tag/{}", config.base_url(), slug))
}

/// Split a `tags:` header value. Names are trimmed and kept in written
/// order, duplicates included; empty names are dropped.
pub fn split_tags(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Content files directly inside `content_dir`, sorted by file name.
pub fn discover(content_dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(content_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && is_content_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

/// Load, validate and order every post in `content_dir`.
///
/// `output_dir` is only used to compute each document's destination; nothing
/// is written.
pub fn load_catalog(
    content_dir: &Path,
    authors: &AuthorTable,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<Catalog, CatalogError> {
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut documents = Vec::new();

    for path in discover(content_dir)? {
        let doc = load_document(&path, content_dir, authors, config, output_dir)?;
        if let Some(first) = seen.get(&doc.slug) {
            return Err(CatalogError::DuplicateSlug {
                slug: doc.slug,
                first: first.clone(),
                second: path,
            });
        }
        seen.insert(doc.slug.clone(), path);
        documents.push(doc);
    }

    let catalog = Catalog::from_documents(documents);
    info!(
        documents = catalog.len(),
        tags = catalog.tags.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

fn load_document(
    path: &Path,
    content_dir: &Path,
    authors: &AuthorTable,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<Document, CatalogError> {
    let slug = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !is_valid_slug(&slug) {
        return Err(CatalogError::InvalidSlug {
            path: path.to_path_buf(),
            slug,
        });
    }

    let raw = std::fs::read_to_string(path)?;
    let parsed = header::parse_header(&raw).map_err(|source| CatalogError::Header {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = parsed.metadata;

    let date_value = metadata.get("date").map(String::as_str).unwrap_or("");
    let date = date::parse_date(date_value).map_err(|source| CatalogError::Date {
        path: path.to_path_buf(),
        source,
    })?;

    let author_id = metadata.get("author").map(String::as_str).unwrap_or("");
    let author = authors
        .get(author_id)
        .cloned()
        .ok_or_else(|| CatalogError::UnknownAuthor {
            path: path.to_path_buf(),
            author: author_id.to_string(),
        })?;

    let tags = metadata
        .get("tags")
        .map(|value| split_tags(value))
        .unwrap_or_default()
        .into_iter()
        .filter_map(|name| match tag_link(config, name) {
            Some(link) => Some(TagLink {
                name: name.to_string(),
                link,
            }),
            None => {
                debug!(slug = %slug, tag = name, "skipping tag without a usable slug");
                None
            }
        })
        .collect();

    let year = format!("{:04}", date.year);
    let month = format!("{:02}", date.month);
    let output_dir = output_dir.join("article").join(&year).join(&month).join(&slug);
    let link = format!("{}/article/{year}/{month}/{slug}", config.base_url());

    debug!(slug = %slug, date = %date.iso(), "loaded document");

    Ok(Document {
        sort_key: date::sort_key(&date, &slug),
        asset_dir: content_dir.join(&slug),
        slug,
        metadata,
        date,
        tags,
        body: parsed.body,
        author,
        output_dir,
        link,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn load(content: &Path) -> Result<Catalog, CatalogError> {
        load_catalog(content, &sample_authors(), &site_config(), Path::new("/build"))
    }

    fn slugs(catalog: &Catalog) -> Vec<&str> {
        catalog.documents.iter().map(|d| d.slug.as_str()).collect()
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    #[test]
    fn discover_only_md_files_at_top_level() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "b-post", "2020-01-01", "");
        std::fs::write(tmp.path().join("UPPER.MD"), "x").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(tmp.path().join("b-post")).unwrap();
        std::fs::write(tmp.path().join("b-post/nested.md"), "x").unwrap();

        let files = discover(tmp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["UPPER.MD", "b-post.md"]);
    }

    #[test]
    fn missing_content_dir_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load(&tmp.path().join("nope"));
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }

    #[test]
    fn empty_content_dir_is_empty_catalog() {
        let tmp = TempDir::new().unwrap();
        let catalog = load(tmp.path()).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.tags.is_empty());
        assert_eq!(catalog.newest_date(), None);
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    #[test]
    fn documents_are_newest_first_with_slug_tie_break() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "a", "2020-05-01", "");
        write_post(tmp.path(), "b", "2020-05-01", "");
        write_post(tmp.path(), "c", "2020-05-02", "");
        write_post(tmp.path(), "d", "2020-04-30", "");

        let catalog = load(tmp.path()).unwrap();
        assert_eq!(slugs(&catalog), vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn sort_keys_strictly_descend() {
        let tmp = TempDir::new().unwrap();
        let posts = [("x", "2019-01-01"), ("y", "2021-12-31 08:00:00"), ("z", "2021-12-31")];
        for (slug, date) in posts {
            write_post(tmp.path(), slug, date, "");
        }

        let catalog = load(tmp.path()).unwrap();
        for pair in catalog.documents.windows(2) {
            assert!(pair[0].sort_key > pair[1].sort_key);
        }
    }

    #[test]
    fn recent_is_a_prefix() {
        let tmp = TempDir::new().unwrap();
        let posts = [
            ("a", "2020-01-01"),
            ("b", "2020-01-02"),
            ("c", "2020-01-03"),
            ("d", "2020-01-04"),
        ];
        for (slug, date) in posts {
            write_post(tmp.path(), slug, date, "");
        }

        let catalog = load(tmp.path()).unwrap();
        let recent: Vec<_> = catalog.recent(3).iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(recent, vec!["d", "c", "b"]);
        assert_eq!(catalog.recent(10).len(), 4);
        assert!(catalog.recent(0).is_empty());
    }

    // =========================================================================
    // Document fields
    // =========================================================================

    #[test]
    fn document_paths_and_links() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "first-post", "2020-5-2 10:30:00", "rust");

        let catalog = load(tmp.path()).unwrap();
        let doc = catalog.find("first-post").unwrap();

        assert_eq!(doc.sort_key, "20200502first-post");
        assert_eq!(doc.link, "https://cafedev.org/article/2020/05/first-post");
        assert_eq!(doc.output_dir, Path::new("/build/article/2020/05/first-post"));
        assert_eq!(doc.asset_dir, tmp.path().join("first-post"));
        assert_eq!(doc.metadata["date"], "2020-5-2 10:30:00");
        assert_eq!(doc.author.name, "Jane Doe");
        assert_eq!(doc.title(), "Post first-post");
    }

    #[test]
    fn tags_are_trimmed_and_keep_duplicates() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "p", "2020-01-01", " rust , web,, rust ,Big Data");

        let catalog = load(tmp.path()).unwrap();
        let doc = catalog.find("p").unwrap();
        let names: Vec<_> = doc.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["rust", "web", "rust", "Big Data"]);
        assert_eq!(doc.tags[3].link, "https://cafedev.org/tag/big-data");
    }

    #[test]
    fn missing_title_and_description_are_empty() {
        let tmp = TempDir::new().unwrap();
        write_raw_post(
            tmp.path(),
            "bare",
            &[("author", "jane"), ("date", "2020-01-01")],
            "Body",
        );

        let catalog = load(tmp.path()).unwrap();
        let doc = catalog.find("bare").unwrap();
        assert_eq!(doc.title(), "");
        assert_eq!(doc.description(), "");
        assert!(doc.tags.is_empty());
        assert_eq!(doc.body, "Body");
    }

    // =========================================================================
    // Tag buckets
    // =========================================================================

    #[test]
    fn tag_buckets_are_subsequences_of_catalog_order() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "a", "2020-01-01", "rust,web");
        write_post(tmp.path(), "b", "2020-02-01", "web");
        write_post(tmp.path(), "c", "2020-03-01", "rust,rust");
        write_post(tmp.path(), "d", "2020-04-01", "");

        let catalog = load(tmp.path()).unwrap();
        let rust: Vec<_> = catalog.tag_documents("rust").map(|d| d.slug.as_str()).collect();
        let web: Vec<_> = catalog.tag_documents("web").map(|d| d.slug.as_str()).collect();

        assert_eq!(rust, vec!["c", "a"]);
        assert_eq!(web, vec!["b", "a"]);
        for bucket in catalog.tags.values() {
            assert!(bucket.windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(catalog.tag_documents("missing").count(), 0);
    }

    #[test]
    fn tags_sharing_a_slug_share_a_page() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "cpost", "2020-01-01", "C");
        write_post(tmp.path(), "cpp", "2020-02-01", "C++,web");
        write_post(tmp.path(), "both", "2020-03-01", "C,C++");
        write_post(tmp.path(), "lower", "2020-04-01", "c");

        let catalog = load(tmp.path()).unwrap();
        let pages = catalog.tag_pages();

        let slugs: Vec<&str> = pages.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "web"]);
        assert_eq!(pages[0].names, vec!["C", "C++", "c"]);
        assert_eq!(pages[0].title(), "C, C++, c");
        let docs: Vec<&str> = catalog
            .page_documents(&pages[0])
            .map(|d| d.slug.as_str())
            .collect();
        assert_eq!(docs, vec!["lower", "both", "cpp", "cpost"]);
    }

    #[test]
    fn tag_without_slug_characters_is_skipped() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "p", "2020-01-01", "rust,!!!");

        let catalog = load(tmp.path()).unwrap();
        assert_eq!(catalog.tags.keys().collect::<Vec<_>>(), vec!["rust"]);
    }

    // =========================================================================
    // Fatal errors
    // =========================================================================

    #[test]
    fn unknown_author_aborts() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "good", "2020-01-01", "");
        write_raw_post(
            tmp.path(),
            "stranger",
            &[("author", "nobody"), ("date", "2020-01-01")],
            "",
        );

        let result = load(tmp.path());
        assert!(matches!(
            result,
            Err(CatalogError::UnknownAuthor { author, .. }) if author == "nobody"
        ));
    }

    #[test]
    fn malformed_header_names_the_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("broken.md"), "# no header").unwrap();

        match load(tmp.path()) {
            Err(CatalogError::Header { path, .. }) => assert!(path.ends_with("broken.md")),
            other => panic!("expected header error, got {other:?}"),
        }
    }

    #[test]
    fn bad_date_aborts() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "p", "2020-02-30", "");
        assert!(matches!(load(tmp.path()), Err(CatalogError::Date { .. })));
    }

    #[test]
    fn missing_date_aborts() {
        let tmp = TempDir::new().unwrap();
        write_raw_post(tmp.path(), "p", &[("author", "jane")], "");
        assert!(matches!(load(tmp.path()), Err(CatalogError::Date { .. })));
    }

    #[test]
    fn invalid_slug_aborts() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "Bad Name", "2020-01-01", "");
        assert!(matches!(
            load(tmp.path()),
            Err(CatalogError::InvalidSlug { slug, .. }) if slug == "Bad Name"
        ));
    }

    #[test]
    fn duplicate_slug_across_extension_case_aborts() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "post", "2020-01-01", "");
        std::fs::copy(tmp.path().join("post.md"), tmp.path().join("post.MD")).unwrap();

        assert!(matches!(
            load(tmp.path()),
            Err(CatalogError::DuplicateSlug { slug, .. }) if slug == "post"
        ));
    }

    #[test]
    fn first_error_in_name_order_is_reported() {
        let tmp = TempDir::new().unwrap();
        write_raw_post(
            tmp.path(),
            "a-post",
            &[("author", "ghost"), ("date", "2020-01-01")],
            "",
        );
        std::fs::write(tmp.path().join("b-post.md"), "no header").unwrap();

        assert!(matches!(
            load(tmp.path()),
            Err(CatalogError::UnknownAuthor { .. })
        ));
    }
}
