//! `sitemap.xml` and `robots.txt` rendering.
//!
//! The builder is an append-only list of locations. It never deduplicates or
//! reorders: the XML lists entries exactly as they were added, so a caller
//! that adds in a deterministic order gets byte-identical output every run.
//!
//! ```text
//! <url>
//!   <loc>https://cafedev.org/article/2020/05/first-post</loc>
//!   <lastmod>2020-05-02</lastmod>
//!   <changefreq>daily</changefreq>
//!   <priority>0.6</priority>
//! </url>
//! ```

use std::fmt::Write;

pub const DEFAULT_PRIORITY: f32 = 0.5;

/// Change frequency for sitemap entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeFreq {
    Always,
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    /// `YYYY-MM-DD`
    pub last_modified: String,
    /// Always within `[0.0, 1.0]`.
    pub priority: f32,
    pub change_frequency: ChangeFreq,
}

#[derive(Debug, Clone, Default)]
pub struct SitemapBuilder {
    entries: Vec<SitemapEntry>,
}

impl SitemapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a location with priority 0.5 and daily change frequency.
    pub fn add_location(&mut self, url: impl Into<String>, last_modified: impl Into<String>) {
        self.add_location_with(url, last_modified, DEFAULT_PRIORITY, ChangeFreq::default());
    }

    /// Add a location. `priority` is clamped into `[0.0, 1.0]`; NaN becomes
    /// the default.
    pub fn add_location_with(
        &mut self,
        url: impl Into<String>,
        last_modified: impl Into<String>,
        priority: f32,
        change_frequency: ChangeFreq,
    ) {
        let priority = if priority.is_nan() {
            DEFAULT_PRIORITY
        } else {
            priority.clamp(0.0, 1.0)
        };
        self.entries.push(SitemapEntry {
            url: url.into(),
            last_modified: last_modified.into(),
            priority,
            change_frequency,
        });
    }

    pub fn entries(&self) -> &[SitemapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the sitemap XML, one `<url>` per entry in insertion order.
    pub fn render(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        xml.push('\n');

        for entry in &self.entries {
            // Writing to a String cannot fail.
            let _ = write!(
                xml,
                "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
                escape_xml(&entry.url),
                escape_xml(&entry.last_modified),
                entry.change_frequency.as_str(),
                entry.priority,
            );
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

/// `robots.txt` allowing everything and pointing at the sitemap.
pub fn render_robots(base_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nSitemap: {}/sitemap.xml\n",
        base_url.trim_end_matches('/')
    )
}

/// Escape XML special characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
