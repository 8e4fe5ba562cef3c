//! Markdown → HTML for post bodies.
//!
//! Thin layer over `pulldown-cmark` with GitHub-style extensions (tables,
//! strikethrough, task lists). Two things are adjustable through
//! [`MarkdownOptions`]:
//!
//! - **Code blocks** are handed to a plain function that returns the finished
//!   HTML, so a highlighter can be swapped in without touching the renderer.
//!   The default emits `<pre><code class="hljs language-…">` for client-side
//!   highlighting.
//! - **Sanitizing** turns raw HTML in the markdown into visible text.

use maud::html;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html as md_html};

/// Renders one code block: `(code, language) -> html`.
pub type CodeBlockRenderer = fn(&str, Option<&str>) -> String;

#[derive(Debug, Clone, Copy)]
pub struct MarkdownOptions {
    pub code_block: CodeBlockRenderer,
    /// Curly quotes and dashes.
    pub smart_punctuation: bool,
    /// Render raw HTML as escaped text instead of passing it through.
    pub sanitize: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            code_block: default_code_block,
            smart_punctuation: false,
            sanitize: true,
        }
    }
}

/// `<pre><code class="hljs language-rust">…</code></pre>`, contents escaped.
pub fn default_code_block(code: &str, lang: Option<&str>) -> String {
    let class = match lang {
        Some(lang) => format!("hljs language-{lang}"),
        None => "hljs".to_string(),
    };
    html! {
        pre { code class=(class) { (code) } }
    }
    .into_string()
}

pub fn render_markdown(body: &str, options: &MarkdownOptions) -> String {
    let mut extensions = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;
    if options.smart_punctuation {
        extensions |= Options::ENABLE_SMART_PUNCTUATION;
    }

    let mut events = Vec::new();
    // (language, accumulated code) while inside a code block
    let mut code: Option<(Option<String>, String)> = None;

    for event in Parser::new_ext(body, extensions) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                code = Some((lang, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, text)) = code.take() {
                    let rendered = (options.code_block)(&text, lang.as_deref());
                    events.push(Event::Html(rendered.into()));
                }
            }
            Event::Text(text) if code.is_some() => {
                if let Some((_, buf)) = code.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::Html(raw) | Event::InlineHtml(raw) if options.sanitize => {
                events.push(Event::Text(raw));
            }
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(body.len() * 3 / 2);
    md_html::push_html(&mut out, events.into_iter());
    out
}
