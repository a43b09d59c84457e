//! Markdown to HTML rendering.

use pulldown_cmark::{Options, Parser, html};

use crate::config::MarkdownConfig;
use crate::error::RenderError;

/// Converts a section body from markdown to HTML.
///
/// The returned HTML is inserted into the page verbatim.
pub trait Renderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

/// pulldown-cmark backed renderer.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::from_config(&MarkdownConfig::default())
    }
}

impl MarkdownRenderer {
    pub fn from_config(config: &MarkdownConfig) -> Self {
        let mut options = Options::empty();
        if config.tables() {
            options.insert(Options::ENABLE_TABLES);
        }
        if config.strikethrough() {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if config.footnotes() {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if config.tasklists() {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        Self { options }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}
