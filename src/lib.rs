//! # Cafe Press
//!
//! A static site builder for a small markdown blog. Each post is a markdown
//! file that starts with a metadata comment; authors live in `authors.json`;
//! the site is rendered into a fresh output directory with article pages,
//! tag pages, an index, a sitemap and `robots.txt`.
//!
//! # Pipeline
//!
//! ```text
//! content/*.md ──parse header, date, author──▶ Catalog (newest first, tag buckets)
//!      │
//!      ├──▶ index.html
//!      ├──▶ article/yyyy/mm/slug/index.html  + copied images and variants
//!      ├──▶ tag/name/index.html
//!      └──▶ sitemap.xml, robots.txt
//! ```
//!
//! Documents render in parallel. Everything that depends on the full set
//! (index, tag pages, sitemap) is built from the catalog, which is loaded
//! completely before any page is written.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`header`] | `<!-- key: value -->` metadata header parsing and writing |
//! | [`date`] | Post dates: validation, display form, sort keys |
//! | [`authors`] | `authors.json` author table |
//! | [`catalog`] | Loads every post into an ordered catalog with tag buckets |
//! | [`generate`] | Build orchestration: stages, parallel rendering, failure policy |
//! | [`templates`] | Page templates behind the `TemplateEngine` trait (maud) |
//! | [`markdown`] | Markdown to HTML with a pluggable code block renderer |
//! | [`media`] | Copies post images and creates header image variants |
//! | [`imaging`] | Image backend trait, `image` crate backend, size parsing |
//! | [`sitemap`] | `sitemap.xml` and `robots.txt` rendering |
//! | [`styles`] | Stylesheet assembly and theme static assets |
//! | [`config`] | `config.toml` loading, validation and color CSS |
//! | [`scaffold`] | Creates new post files |
//! | [`naming`] | Slug rules and sized filenames |
//! | [`types`] | The `Document` shared by catalog, templates and media |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fresh Output Every Build
//!
//! The output directory is removed and recreated at the start of a build.
//! There is no incremental mode: a build's output depends only on its inputs,
//! and two builds of the same content are byte-identical.
//!
//! ## Load Everything, Then Render
//!
//! The catalog is validated completely before rendering starts. A post with
//! an unknown author or a bad date fails the build with nothing written,
//! instead of leaving a half-built site.
//!
//! ## Images Never Fail a Build
//!
//! A post whose images cannot be copied or resized still gets its page. The
//! failure is logged with the post's slug and listed in the build summary.

pub mod authors;
pub mod catalog;
pub mod config;
pub mod date;
pub mod generate;
pub mod header;
pub mod imaging;
pub mod markdown;
pub mod media;
pub mod naming;
pub mod output;
pub mod scaffold;
pub mod sitemap;
pub mod styles;
pub mod templates;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global tracing subscriber.
///
/// `verbose` is the `-v` count: 0 warnings, 1 info, 2 debug, 3 or more trace.
/// `RUST_LOG` overrides it.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}
