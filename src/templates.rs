//! Page templates.
//!
//! Rendering goes through the [`TemplateEngine`] trait so the orchestrator
//! never depends on a concrete template system. The default engine,
//! [`MaudTemplates`], builds every page with [maud](https://maud.lambda.xyz/):
//! templates are Rust code, checked at compile time, with all interpolation
//! escaped. Only the already-rendered markdown body is inserted raw.
//!
//! ## Page Layout
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ site header (title → home)               │
//! ├───────────────────────────────┬──────────┤
//! │ main                          │ Recent   │
//! │   index:   post cards         │  post 1  │
//! │   article: header img, body   │  post 2  │
//! │   tag:     post cards         │  post 3  │
//! └───────────────────────────────┴──────────┘
//! ```
//!
//! Stylesheet and links are absolute (`/static/style.css`, canonical post
//! URLs), so a page renders the same wherever it is written.

use crate::config::SiteConfig;
use crate::naming::sized_filename;
use crate::types::Document;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::BTreeSet;
use thiserror::Error;

pub const STYLESHEET_HREF: &str = "/static/style.css";

static NO_SLUGS: BTreeSet<String> = BTreeSet::new();

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template failed: {0}")]
    Render(String),
}

/// Data shared by every page.
#[derive(Debug, Clone, Copy)]
pub struct SiteView<'a> {
    pub config: &'a SiteConfig,
    /// Newest posts, for the sidebar.
    pub recent: &'a [Document],
    /// Slugs whose header image has no resized variants. Their pages show
    /// no header image instead of a broken one.
    pub missing_headers: &'a BTreeSet<String>,
}

impl<'a> SiteView<'a> {
    pub fn new(config: &'a SiteConfig, recent: &'a [Document]) -> Self {
        Self {
            config,
            recent,
            missing_headers: &NO_SLUGS,
        }
    }

    pub fn with_missing_headers(self, missing_headers: &'a BTreeSet<String>) -> Self {
        Self {
            missing_headers,
            ..self
        }
    }
}

/// Everything a template needs for one page.
#[derive(Debug, Clone, Copy)]
pub enum PageView<'a> {
    Index {
        site: SiteView<'a>,
        documents: &'a [Document],
    },
    Article {
        site: SiteView<'a>,
        document: &'a Document,
        /// Body already rendered to HTML.
        content: &'a str,
    },
    Tag {
        site: SiteView<'a>,
        name: &'a str,
        documents: &'a [&'a Document],
    },
}

impl<'a> PageView<'a> {
    pub fn site(&self) -> SiteView<'a> {
        match *self {
            Self::Index { site, .. } | Self::Article { site, .. } | Self::Tag { site, .. } => site,
        }
    }
}

/// Turns a page view into a complete HTML document.
///
/// Called from rayon workers, hence `Sync`.
pub trait TemplateEngine: Sync {
    fn render(&self, view: &PageView<'_>) -> Result<String, TemplateError>;
}

/// Default engine: compile-time maud templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaudTemplates;

impl TemplateEngine for MaudTemplates {
    fn render(&self, view: &PageView<'_>) -> Result<String, TemplateError> {
        let markup = match *view {
            PageView::Index { site, documents } => render_index(site, documents),
            PageView::Article {
                site,
                document,
                content,
            } => render_article(site, document, content),
            PageView::Tag {
                site,
                name,
                documents,
            } => render_tag(site, name, documents),
        };
        Ok(markup.into_string())
    }
}

// ============================================================================
// Image URLs
// ============================================================================

/// URL of a resized header image variant, if the post has a header image
/// and its variants exist.
pub fn header_image_url(site: SiteView<'_>, document: &Document, token: &str) -> Option<String> {
    if site.missing_headers.contains(&document.slug) {
        return None;
    }
    document
        .header_image()
        .map(|img| format!("{}/{}", document.link, sized_filename(img, token)))
}

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(site: SiteView<'_>, title: &str, description: &str, content: Markup) -> Markup {
    let config = site.config;
    let full_title = if title.is_empty() {
        config.title.clone()
    } else {
        format!("{} | {}", title, config.title)
    };

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if !description.is_empty() {
                    meta name="description" content=(description);
                }
                title { (full_title) }
                link rel="stylesheet" href=(STYLESHEET_HREF);
            }
            body {
                header.site-header {
                    a.site-title href={ (config.base_url()) "/" } { (config.title) }
                }
                div.layout {
                    main { (content) }
                    (sidebar(site.recent))
                }
            }
        }
    }
}

fn sidebar(recent: &[Document]) -> Markup {
    html! {
        aside.sidebar {
            h2 { "Recent" }
            ul.recent-posts {
                @for doc in recent {
                    li { a href=(doc.link) { (doc.title()) } }
                }
            }
        }
    }
}

fn post_card(site: SiteView<'_>, doc: &Document) -> Markup {
    let thumb = header_image_url(site, doc, &site.config.thumbnails.index);
    html! {
        article.post-card {
            @if let Some(src) = thumb {
                a.post-thumb href=(doc.link) {
                    img src=(src) alt=(doc.title()) loading="lazy";
                }
            }
            h2 { a href=(doc.link) { (doc.title()) } }
            p.post-meta {
                time datetime=(doc.date.iso()) { (doc.date.display()) }
            }
            @if !doc.description().is_empty() {
                p.post-description { (doc.description()) }
            }
        }
    }
}

fn author_line(doc: &Document) -> Markup {
    html! {
        @if let Some(url) = doc.author.extra.get("url") {
            a.author href=(url) { (doc.author.name) }
        } @else {
            span.author { (doc.author.name) }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_index(site: SiteView<'_>, documents: &[Document]) -> Markup {
    let content = html! {
        section.post-list {
            @for doc in documents {
                (post_card(site, doc))
            }
        }
    };
    base_document(site, "", "", content)
}

fn render_article(site: SiteView<'_>, doc: &Document, body_html: &str) -> Markup {
    let header_img = header_image_url(site, doc, &site.config.thumbnails.header);
    let mut seen = BTreeSet::new();
    let tags: Vec<_> = doc.tags.iter().filter(|t| seen.insert(&t.name)).collect();

    let content = html! {
        article.post {
            header.post-header {
                @if let Some(src) = header_img {
                    img.header-image src=(src) alt=(doc.title());
                }
                h1 { (doc.title()) }
                @if let Some(subtitle) = doc.subtitle() {
                    p.subtitle { (subtitle) }
                }
                p.post-meta {
                    "By " (author_line(doc)) " on "
                    time datetime=(doc.date.iso()) { (doc.date.display()) }
                }
            }
            div.post-content {
                (PreEscaped(body_html))
            }
            @if !tags.is_empty() {
                nav.post-tags {
                    ul {
                        @for tag in &tags {
                            li { a href=(tag.link) { (tag.name) } }
                        }
                    }
                }
            }
        }
    };

    base_document(site, doc.title(), doc.description(), content)
}

fn render_tag(site: SiteView<'_>, name: &str, documents: &[&Document]) -> Markup {
    let content = html! {
        section.post-list {
            h1.tag-title { "Posts tagged " em { (name) } }
            @for doc in documents {
                (post_card(site, doc))
            }
        }
    };
    base_document(site, name, "", content)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::path::Path;

    fn doc(slug: &str, date: &str, tags: &[&str]) -> Document {
        document(slug, date, tags, Path::new("/build"), Path::new("/content"))
    }

    fn render(view: PageView<'_>) -> String {
        MaudTemplates.render(&view).unwrap()
    }

    #[test]
    fn index_lists_documents_and_sidebar() {
        let config = site_config();
        let docs = vec![doc("newer", "2020-05-02", &[]), doc("older", "2020-05-01", &[])];
        let site = SiteView::new(&config, &docs[..1]);

        let html = render(PageView::Index {
            site,
            documents: &docs,
        });

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Cafe Dev</title>"));
        assert!(html.contains(r#"href="/static/style.css""#));
        assert!(html.contains("https://cafedev.org/article/2020/05/newer"));
        assert!(html.contains("https://cafedev.org/article/2020/05/older"));
        assert!(html.find("Post newer").unwrap() < html.find("Post older").unwrap());
        assert!(html.contains("2nd May 2020"));
    }

    #[test]
    fn article_page_has_body_meta_and_tags() {
        let config = site_config();
        let document = doc("first-post", "2020-05-02", &["rust", "web", "rust"]);

        let html = render(PageView::Article {
            site: SiteView::new(&config, &[]),
            document: &document,
            content: "<p>Rendered <strong>body</strong></p>",
        });

        assert!(html.contains("<title>Post first-post | Cafe Dev</title>"));
        assert!(html.contains("<p>Rendered <strong>body</strong></p>"));
        assert!(html.contains("Jane Doe"));
        assert!(html.contains(r#"<time datetime="2020-05-02">2nd May 2020</time>"#));
        assert_eq!(html.matches(r#"href="https://cafedev.org/tag/rust""#).count(), 1);
        assert!(html.contains(r#"href="https://cafedev.org/tag/web""#));
    }

    #[test]
    fn article_header_image_uses_header_size() {
        let config = site_config();
        let mut document = doc("pics", "2020-05-02", &[]);
        document
            .metadata
            .insert("headerImg".to_string(), "Cover.JPG".to_string());

        let html = render(PageView::Article {
            site: SiteView::new(&config, &[]),
            document: &document,
            content: "",
        });

        assert!(html.contains(r#"src="https://cafedev.org/article/2020/05/pics/Cover.1200x.jpg""#));
    }

    #[test]
    fn missing_header_variants_hide_the_image() {
        let config = site_config();
        let mut document = doc("pics", "2020-05-02", &[]);
        document
            .metadata
            .insert("headerImg".to_string(), "cover.jpg".to_string());
        let missing: BTreeSet<String> = ["pics".to_string()].into();
        let site = SiteView::new(&config, &[]).with_missing_headers(&missing);
        let docs = vec![document.clone()];

        let article = render(PageView::Article {
            site,
            document: &document,
            content: "",
        });
        let index = render(PageView::Index {
            site,
            documents: &docs,
        });

        assert!(!article.contains("cover.1200x.jpg"));
        assert!(!article.contains("header-image"));
        assert!(!index.contains("cover.400x.jpg"));
    }

    #[test]
    fn index_card_uses_index_thumbnail() {
        let config = site_config();
        let mut document = doc("pics", "2020-05-02", &[]);
        document
            .metadata
            .insert("headerImg".to_string(), "cover.png".to_string());
        let docs = vec![document];

        let html = render(PageView::Index {
            site: SiteView::new(&config, &[]),
            documents: &docs,
        });

        assert!(html.contains("pics/cover.400x.png"));
    }

    #[test]
    fn titles_are_escaped() {
        let config = site_config();
        let mut document = doc("x", "2020-01-01", &[]);
        document
            .metadata
            .insert("title".to_string(), "<script>".to_string());

        let html = render(PageView::Article {
            site: SiteView::new(&config, &[]),
            document: &document,
            content: "",
        });

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn tag_page_lists_bucket() {
        let config = site_config();
        let a = doc("a", "2020-01-02", &["rust"]);
        let b = doc("b", "2020-01-01", &["rust"]);
        let bucket = [&a, &b];

        let html = render(PageView::Tag {
            site: SiteView::new(&config, &[]),
            name: "rust",
            documents: &bucket,
        });

        assert!(html.contains("Posts tagged <em>rust</em>"));
        assert!(html.find("Post a").unwrap() < html.find("Post b").unwrap());
    }

    #[test]
    fn author_url_becomes_link() {
        let config = site_config();
        let mut document = doc("x", "2020-01-01", &[]);
        document
            .author
            .extra
            .insert("url".to_string(), "https://jane.example".to_string());

        let html = render(PageView::Article {
            site: SiteView::new(&config, &[]),
            document: &document,
            content: "",
        });

        assert!(html.contains(r#"href="https://jane.example""#));
        assert!(html.contains(">Jane Doe</a>"));
    }
}
