//! Site build orchestration.
//!
//! Takes a content directory, an author table and a config, and produces the
//! complete static site. Every build starts from an empty output directory.
//!
//! ## Stages
//!
//! ```text
//! Idle ──reset output, load catalog──▶ CatalogLoaded
//!      ──styles, index, documents────▶ Rendering
//!      ──tag pages, sitemap, robots──▶ Finalizing ──▶ Done
//!
//! any fatal error ─────────────────────────────────▶ Failed
//! ```
//!
//! ## Failure Policy
//!
//! - **Unsafe output** (an output directory that is or contains the content
//!   or theme directory) is refused before anything is removed.
//! - **Catalog errors** (bad header, unknown author, …) abort before any page
//!   is written.
//! - **Page errors** (template or write failure) are fatal, but only after
//!   every document task has finished. The error reported is the first
//!   failing document in catalog order, so it is the same on every run.
//! - **Media errors** never fail a build. They are logged with the post's
//!   slug and listed in [`BuildReport::media_failures`]. Pages that linked
//!   the missing header variants are rewritten without them.
//!
//! ## Output Structure
//!
//! ```text
//! build/
//! ├── index.html                          # newest posts
//! ├── article/2020/05/first-post/
//! │   ├── index.html
//! │   ├── cover.jpg                       # copied from content/first-post/
//! │   ├── cover.400x.jpg                  # index thumbnail
//! │   └── cover.1200x.jpg                 # article header
//! ├── tag/rust/index.html
//! ├── static/style.css                    # colors + theme stylesheet
//! ├── sitemap.xml
//! └── robots.txt
//! ```
//!
//! ## Concurrency
//!
//! Documents render in parallel on the rayon pool (sized by
//! `processing.max_processes`). Each task only writes below its own article
//! directory. Results come back in catalog order through `collect`, and the
//! sitemap is filled from them afterwards, so no lock is involved and the
//! sitemap is identical across runs.

use crate::authors::AuthorTable;
use crate::catalog::{self, Catalog, CatalogError};
use crate::config::SiteConfig;
use crate::imaging::{ImageBackend, RustBackend};
use crate::markdown::{MarkdownOptions, render_markdown};
use crate::media::{self, MediaError, MediaTransfer, TransferReport};
use crate::sitemap::{ChangeFreq, SitemapBuilder, render_robots};
use crate::styles::{self, StyleError};
use crate::templates::{MaudTemplates, PageView, SiteView, TemplateEngine, TemplateError};
use crate::types::Document;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const HOME_PRIORITY: f32 = 1.0;
pub const DOCUMENT_PRIORITY: f32 = 0.6;
pub const TAG_PRIORITY: f32 = 0.4;

/// Where a build reads from and writes to.
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub content: PathBuf,
    pub output: PathBuf,
    pub theme: PathBuf,
}

/// Swappable collaborators. [`generate`] uses maud templates, the `image`
/// backend and default markdown options.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub templates: &'a dyn TemplateEngine,
    pub backend: &'a dyn ImageBackend,
    pub markdown: MarkdownOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Idle,
    CatalogLoaded,
    Rendering,
    Finalizing,
    Done,
    Failed,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::CatalogLoaded => "catalog-loaded",
            Self::Rendering => "rendering",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// Failure to produce one page.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("template error")]
    Template(#[from] TemplateError),
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("failed to reset output directory {}", .path.display())]
    Reset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("refusing to reset output directory {}: it contains {}", .output.display(), .inner.display())]
    OutputContainsSource { output: PathBuf, inner: PathBuf },
    #[error("failed to load content")]
    Catalog(#[from] CatalogError),
    #[error("failed to build stylesheet")]
    Styles(#[from] StyleError),
    #[error("failed to render index page")]
    Index(#[source] PageError),
    #[error("failed to render document {slug:?}")]
    Document {
        slug: String,
        #[source]
        source: PageError,
    },
    #[error("failed to render tag page {tag:?}")]
    Tag {
        tag: String,
        #[source]
        source: PageError,
    },
    #[error("failed to write {}", .path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    /// The stage the build was in when this error stopped it. Catalog errors
    /// belong to `CatalogLoaded`: the stage is only entered once the catalog
    /// is complete, and they are what keeps it from being entered.
    pub fn stage(&self) -> BuildStage {
        match self {
            Self::Reset { .. } | Self::OutputContainsSource { .. } => BuildStage::Idle,
            Self::Catalog(_) => BuildStage::CatalogLoaded,
            Self::Styles(_) | Self::Index(_) | Self::Document { .. } => BuildStage::Rendering,
            Self::Tag { .. } | Self::Finalize { .. } => BuildStage::Finalizing,
        }
    }

    /// Slug of the document that failed, for document errors.
    pub fn slug(&self) -> Option<&str> {
        match self {
            Self::Document { slug, .. } => Some(slug),
            _ => None,
        }
    }
}

/// A media failure that was logged and skipped.
#[derive(Debug)]
pub struct MediaFailure {
    pub slug: String,
    pub error: MediaError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub slug: String,
    pub title: String,
    /// Page path relative to the output directory.
    pub page: PathBuf,
    pub images: usize,
    pub variants: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTag {
    pub name: String,
    pub page: PathBuf,
    pub documents: usize,
}

/// Summary of a successful build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// In catalog order.
    pub documents: Vec<RenderedDocument>,
    /// One per tag page, in slug order.
    pub tags: Vec<RenderedTag>,
    pub media_failures: Vec<MediaFailure>,
    pub sitemap_entries: usize,
    pub images_copied: usize,
    pub variants_created: usize,
}

/// Build the site with the default collaborators.
pub fn generate(
    paths: &SitePaths,
    config: &SiteConfig,
    authors: &AuthorTable,
) -> Result<BuildReport, GenerateError> {
    let templates = MaudTemplates;
    let backend = RustBackend::new();
    let collaborators = Collaborators {
        templates: &templates,
        backend: &backend,
        markdown: MarkdownOptions::default(),
    };
    generate_with(paths, config, authors, &collaborators)
}

pub fn generate_with(
    paths: &SitePaths,
    config: &SiteConfig,
    authors: &AuthorTable,
    collaborators: &Collaborators<'_>,
) -> Result<BuildReport, GenerateError> {
    let mut build = Build {
        paths,
        config,
        collaborators,
        stage: BuildStage::Idle,
    };
    info!(output = %paths.output.display(), "starting build");

    match build.run(authors) {
        Ok(report) => {
            build.advance(BuildStage::Done);
            Ok(report)
        }
        Err(err) => {
            error!(stage = %err.stage(), error = %err, "build failed");
            build.advance(BuildStage::Failed);
            Err(err)
        }
    }
}

struct Build<'a> {
    paths: &'a SitePaths,
    config: &'a SiteConfig,
    collaborators: &'a Collaborators<'a>,
    stage: BuildStage,
}

/// Outcome of one document task: the page result, then the media result.
type DocumentOutcome = Result<(RenderedDocument, Result<TransferReport, MediaError>), PageError>;

impl Build<'_> {
    fn advance(&mut self, next: BuildStage) {
        info!(from = %self.stage, to = %next, "build stage");
        self.stage = next;
    }

    fn run(&mut self, authors: &AuthorTable) -> Result<BuildReport, GenerateError> {
        let paths = self.paths;
        let output = &paths.output;
        reset_output(paths)?;
        let catalog = catalog::load_catalog(&paths.content, authors, self.config, output)?;
        self.advance(BuildStage::CatalogLoaded);

        self.advance(BuildStage::Rendering);
        let mut report = BuildReport::default();
        self.write_styles()?;

        let recent = catalog.recent(self.config.recent_count);
        let mut missing_headers: BTreeSet<String> = catalog
            .documents
            .iter()
            .filter(|doc| doc.header_image().is_some() && !media::has_header_source(doc))
            .map(|doc| doc.slug.clone())
            .collect();

        let site = SiteView::new(self.config, recent).with_missing_headers(&missing_headers);
        self.write_index(site)?;
        let failed_headers = self.render_documents(&catalog, site, &mut report)?;

        missing_headers.extend(failed_headers.iter().cloned());
        let site = SiteView::new(self.config, recent).with_missing_headers(&missing_headers);
        if !failed_headers.is_empty() {
            self.rewrite_without_headers(&catalog, site, &failed_headers)?;
        }

        self.advance(BuildStage::Finalizing);
        self.render_tags(&catalog, site, &mut report)?;
        report.sitemap_entries = self.write_sitemap(&catalog)?;

        info!(
            documents = report.documents.len(),
            tags = report.tags.len(),
            media_failures = report.media_failures.len(),
            "build finished"
        );
        Ok(report)
    }

    fn render(&self, view: &PageView<'_>) -> Result<String, PageError> {
        Ok(self.collaborators.templates.render(view)?)
    }

    fn write_index(&self, site: SiteView<'_>) -> Result<(), GenerateError> {
        self.render(&PageView::Index {
            site,
            documents: site.recent,
        })
        .and_then(|html| write_page(&self.paths.output.join("index.html"), &html))
        .map_err(GenerateError::Index)
    }

    fn write_styles(&self) -> Result<(), GenerateError> {
        let static_dir = self.paths.output.join("static");
        let css = styles::compile_styles(&self.paths.theme, &self.config.colors)?;
        fs::create_dir_all(&static_dir).map_err(StyleError::from)?;
        fs::write(static_dir.join("style.css"), css).map_err(StyleError::from)?;
        let assets = styles::copy_theme_assets(&self.paths.theme, &static_dir)?;
        debug!(assets, "stylesheet written");
        Ok(())
    }

    /// Render every document in parallel, wait for all of them, then report.
    ///
    /// Returns the slugs of documents whose header image variants could not
    /// be created.
    fn render_documents(
        &self,
        catalog: &Catalog,
        site: SiteView<'_>,
        report: &mut BuildReport,
    ) -> Result<Vec<String>, GenerateError> {
        let media = MediaTransfer::from_config(self.collaborators.backend, &self.config.thumbnails);

        let outcomes: Vec<DocumentOutcome> = catalog
            .documents
            .par_iter()
            .map(|doc| self.render_document(doc, site, &media))
            .collect();

        let mut first_error = None;
        let mut failed_headers = Vec::new();
        for (doc, outcome) in catalog.documents.iter().zip(outcomes) {
            match outcome {
                Ok((mut rendered, media_result)) => {
                    match media_result {
                        Ok(transfer) => {
                            rendered.images = transfer.copied.len();
                            rendered.variants = transfer.variants.len();
                            report.images_copied += rendered.images;
                            report.variants_created += rendered.variants;
                        }
                        Err(err) => {
                            warn!(slug = %doc.slug, error = %err, "image transfer failed");
                            if doc.header_image().is_some() {
                                failed_headers.push(doc.slug.clone());
                            }
                            report.media_failures.push(MediaFailure {
                                slug: doc.slug.clone(),
                                error: err,
                            });
                        }
                    }
                    report.documents.push(rendered);
                }
                Err(err) => {
                    error!(slug = %doc.slug, error = %err, "document failed");
                    if first_error.is_none() {
                        first_error = Some(GenerateError::Document {
                            slug: doc.slug.clone(),
                            source: err,
                        });
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(failed_headers),
        }
    }

    /// Rewrite the pages that pointed at header variants which were never
    /// created: the articles themselves, and the index if it lists one.
    fn rewrite_without_headers(
        &self,
        catalog: &Catalog,
        site: SiteView<'_>,
        slugs: &[String],
    ) -> Result<(), GenerateError> {
        for doc in catalog.documents.iter().filter(|d| slugs.contains(&d.slug)) {
            debug!(slug = %doc.slug, "rewriting page without header image");
            self.write_article(doc, site)
                .map_err(|source| GenerateError::Document {
                    slug: doc.slug.clone(),
                    source,
                })?;
        }
        if site.recent.iter().any(|d| slugs.contains(&d.slug)) {
            self.write_index(site)?;
        }
        Ok(())
    }

    /// Render and write one article page; returns the page path.
    fn write_article(&self, doc: &Document, site: SiteView<'_>) -> Result<PathBuf, PageError> {
        let content = render_markdown(&doc.body, &self.collaborators.markdown);
        let html = self.render(&PageView::Article {
            site,
            document: doc,
            content: &content,
        })?;
        let page = doc.output_dir.join("index.html");
        write_page(&page, &html)?;
        Ok(page)
    }

    fn render_document(
        &self,
        doc: &Document,
        site: SiteView<'_>,
        media: &MediaTransfer<'_>,
    ) -> DocumentOutcome {
        let page = self.write_article(doc, site)?;
        debug!(slug = %doc.slug, "rendered document");

        let rendered = RenderedDocument {
            slug: doc.slug.clone(),
            title: doc.title().to_string(),
            page: relative(&self.paths.output, &page),
            images: 0,
            variants: 0,
        };
        Ok((rendered, media.transfer_images(doc)))
    }

    /// One page per tag slug. Tag names sharing a slug share the page.
    fn render_tags(
        &self,
        catalog: &Catalog,
        site: SiteView<'_>,
        report: &mut BuildReport,
    ) -> Result<(), GenerateError> {
        for tag in catalog.tag_pages() {
            let documents: Vec<&Document> = catalog.page_documents(&tag).collect();
            let title = tag.title();
            if tag.names.len() > 1 {
                debug!(slug = %tag.slug, names = %title, "tags share a page");
            }

            let page = self.paths.output.join("tag").join(&tag.slug).join("index.html");
            self.render(&PageView::Tag {
                site,
                name: &title,
                documents: &documents,
            })
            .and_then(|html| write_page(&page, &html))
            .map_err(|source| GenerateError::Tag {
                tag: title.clone(),
                source,
            })?;

            report.tags.push(RenderedTag {
                name: title,
                page: relative(&self.paths.output, &page),
                documents: documents.len(),
            });
        }
        Ok(())
    }

    /// Write `sitemap.xml` and `robots.txt`; returns the number of entries.
    fn write_sitemap(&self, catalog: &Catalog) -> Result<usize, GenerateError> {
        let sitemap = build_sitemap(catalog, self.config, &today());
        let base_url = self.config.base_url();

        for (name, content) in [
            ("sitemap.xml", sitemap.render()),
            ("robots.txt", render_robots(&base_url)),
        ] {
            let path = self.paths.output.join(name);
            fs::write(&path, content).map_err(|source| GenerateError::Finalize { path, source })?;
        }
        Ok(sitemap.len())
    }
}

/// Sitemap entries for a catalog: home, then documents in catalog order,
/// then one entry per tag page in slug order.
///
/// `today` is the home page's last-modified date when there are no
/// documents.
pub fn build_sitemap(catalog: &Catalog, config: &SiteConfig, today: &str) -> SitemapBuilder {
    let mut sitemap = SitemapBuilder::new();
    let home_lastmod = catalog
        .newest_date()
        .map(|d| d.iso())
        .unwrap_or_else(|| today.to_string());
    sitemap.add_location_with(
        format!("{}/", config.base_url()),
        home_lastmod,
        HOME_PRIORITY,
        ChangeFreq::Daily,
    );

    for doc in &catalog.documents {
        sitemap.add_location_with(&doc.link, doc.date.iso(), DOCUMENT_PRIORITY, ChangeFreq::Daily);
    }

    for tag in catalog.tag_pages() {
        let Some(newest) = catalog.page_documents(&tag).next() else {
            continue;
        };
        sitemap.add_location_with(
            format!("{}/tag/{}", config.base_url(), tag.slug),
            newest.date.iso(),
            TAG_PRIORITY,
            ChangeFreq::Daily,
        );
    }

    sitemap
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Remove and recreate the output directory.
///
/// Refuses when the output directory is, or contains, the content or theme
/// directory.
fn reset_output(paths: &SitePaths) -> Result<(), GenerateError> {
    let output = &paths.output;
    let reset = |source| GenerateError::Reset {
        path: output.to_path_buf(),
        source,
    };
    if output.exists() {
        let root = output.canonicalize().map_err(reset)?;
        for inner in [&paths.content, &paths.theme] {
            if inner.canonicalize().is_ok_and(|dir| dir.starts_with(&root)) {
                return Err(GenerateError::OutputContainsSource {
                    output: output.clone(),
                    inner: inner.clone(),
                });
            }
        }
        fs::remove_dir_all(output).map_err(reset)?;
    }
    fs::create_dir_all(output).map_err(reset)?;
    debug!(path = %output.display(), "output directory reset");
    Ok(())
}

fn write_page(path: &Path, html: &str) -> Result<(), PageError> {
    let write_err = |source| PageError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, html).map_err(write_err)
}

fn relative(base: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(base).unwrap_or(path).to_path_buf()
}

// ============================================================================
// Tests
// ============================================================================
