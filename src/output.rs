//! CLI output formatting.
//!
//! Output leads with what a reader cares about (post titles, tag names) and
//! shows files as secondary context on indented lines.
//!
//! ## Check
//!
//! ```text
//! Posts
//! 001 Second post
//!     Source: second-post.md
//!     Date: 2nd May 2020
//!     Author: Jane Doe
//!     Tags: rust, web
//!
//! Tags
//! 001 rust (2 posts)
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! 001 Second post → article/2020/05/second-post/index.html
//!     Images: 2 copied, 2 variants
//!
//! Tags
//! 001 rust (2 posts) → tag/rust/index.html
//!
//! Warnings
//!     pics: failed to resize build/article/2020/05/pics/cover.jpg
//!
//! Generated 2 posts, 1 tag page, 4 sitemap entries
//! ```
//!
//! Each `format_*` function is pure and returns lines; `print_*` writes them
//! to stdout.

use crate::catalog::Catalog;
use crate::generate::BuildReport;
use std::error::Error;
use std::path::Path;

fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_catalog(catalog: &Catalog) -> Vec<String> {
    let mut lines = vec!["Posts".to_string()];
    for (i, doc) in catalog.documents.iter().enumerate() {
        let title = if doc.title().is_empty() {
            format!("({})", doc.slug)
        } else {
            doc.title().to_string()
        };
        lines.push(format!("{} {}", format_index(i + 1), title));
        lines.push(format!("    Source: {}.md", doc.slug));
        lines.push(format!("    Date: {}", doc.date.display()));
        lines.push(format!("    Author: {}", doc.author.name));
        if !doc.tags.is_empty() {
            let names: Vec<&str> = doc.tags.iter().map(|t| t.name.as_str()).collect();
            lines.push(format!("    Tags: {}", names.join(", ")));
        }
    }

    if !catalog.tags.is_empty() {
        lines.push(String::new());
        lines.push("Tags".to_string());
        for (i, (name, bucket)) in catalog.tags.iter().enumerate() {
            lines.push(format!(
                "{} {} ({})",
                format_index(i + 1),
                name,
                plural(bucket.len(), "post", "posts")
            ));
        }
    }
    lines
}

pub fn print_catalog(catalog: &Catalog) {
    for line in format_catalog(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = vec!["Home → index.html".to_string()];
    for (i, doc) in report.documents.iter().enumerate() {
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            if doc.title.is_empty() { &doc.slug } else { &doc.title },
            doc.page.display()
        ));
        if doc.images > 0 {
            lines.push(format!(
                "    Images: {} copied, {}",
                doc.images,
                plural(doc.variants, "variant", "variants")
            ));
        }
    }

    if !report.tags.is_empty() {
        lines.push(String::new());
        lines.push("Tags".to_string());
        for (i, tag) in report.tags.iter().enumerate() {
            lines.push(format!(
                "{} {} ({}) → {}",
                format_index(i + 1),
                tag.name,
                plural(tag.documents, "post", "posts"),
                tag.page.display()
            ));
        }
    }

    if !report.media_failures.is_empty() {
        lines.push(String::new());
        lines.push("Warnings".to_string());
        for failure in &report.media_failures {
            lines.push(format!("    {}: {}", failure.slug, failure.error));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}",
        plural(report.documents.len(), "post", "posts"),
        plural(report.tags.len(), "tag page", "tag pages"),
        plural(report.sitemap_entries, "sitemap entry", "sitemap entries")
    ));
    lines
}

pub fn print_build_report(report: &BuildReport, output_dir: &Path) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
    println!("==> Build complete: {}", output_dir.display());
}

// ============================================================================
// Errors
// ============================================================================

/// The error followed by its `source()` chain, one cause per line.
pub fn format_error_chain(err: &dyn Error) -> Vec<String> {
    let mut lines = vec![format!("error: {}", err)];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("  caused by: {}", cause));
        source = cause.source();
    }
    lines
}

pub fn eprint_error(err: &dyn Error) {
    for line in format_error_chain(err) {
        eprintln!("{}", line);
    }
}
