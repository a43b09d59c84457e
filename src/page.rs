//! Page containers that receive rendered sections.

use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::error::LoadError;

/// Access to the containers of an already loaded page.
pub trait Page {
    fn has_container(&self, id: &str) -> bool;

    /// Replace the whole content of container `id` with `html`.
    fn set_content(&mut self, id: &str, html: &str) -> crate::error::Result<()>;
}

/// An HTML document whose containers are elements carrying an `id` attribute.
///
/// Writing a container replaces that element's inner HTML and leaves every
/// other byte of the document untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlPage {
    html: String,
}

impl HtmlPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Read a page template from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page template {}", path.display()))?;
        debug!(path = %path.display(), bytes = html.len(), "page:loaded");
        Ok(Self::new(html))
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }

    /// Current inner HTML of container `id`.
    pub fn content(&self, id: &str) -> Option<&str> {
        self.inner_range(id).map(|range| &self.html[range])
    }

    /// Byte range of the inner HTML of the first element with `id` that is
    /// not inside an HTML comment.
    fn inner_range(&self, id: &str) -> Option<Range<usize>> {
        let opener = Regex::new(&format!(
            r#"<([A-Za-z][A-Za-z0-9-]*)[^>]*?\s(?i:id)\s*=\s*(?:"{id}"|'{id}')[^>]*>"#,
            id = regex::escape(id)
        ))
        .ok()?;
        let comments = comment_spans(&self.html);
        let open = opener
            .captures_iter(&self.html)
            .find(|c| c.get(0).is_some_and(|m| !in_comment(&comments, m.start())))?;
        let whole = open.get(0)?;
        if whole.as_str().ends_with("/>") {
            return None;
        }
        let tag = open.get(1)?.as_str();
        let start = whole.end();
        let end = closing_tag_start(&self.html, start, tag, &comments)?;
        Some(start..end)
    }
}

impl std::fmt::Display for HtmlPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.html)
    }
}

impl Page for HtmlPage {
    fn has_container(&self, id: &str) -> bool {
        self.inner_range(id).is_some()
    }

    fn set_content(&mut self, id: &str, html: &str) -> crate::error::Result<()> {
        let range = self.inner_range(id).ok_or_else(|| LoadError::binding(id))?;
        debug!(container = id, replaced = range.len(), written = html.len(), "page:set_content");
        self.html.replace_range(range, html);
        Ok(())
    }
}

/// Position of the `</tag>` closing an element whose opening tag ends at
/// `from`. Nested elements with the same name and tags inside comments are
/// skipped.
fn closing_tag_start(
    html: &str,
    from: usize,
    tag: &str,
    comments: &[Range<usize>],
) -> Option<usize> {
    let tags = Regex::new(&format!(r"(?i)<(/?){}\b[^>]*>", regex::escape(tag))).ok()?;
    let mut depth = 0usize;
    for found in tags.captures_iter(&html[from..]) {
        let whole = found.get(0)?;
        let at = from + whole.start();
        if in_comment(comments, at) {
            continue;
        }
        let closing = found.get(1).is_some_and(|m| !m.as_str().is_empty());
        if closing {
            if depth == 0 {
                return Some(at);
            }
            depth -= 1;
        } else if !whole.as_str().ends_with("/>") {
            depth += 1;
        }
    }
    None
}

/// Byte ranges of `<!-- ... -->` comments. An unterminated comment runs to
/// the end of the document.
fn comment_spans(html: &str) -> Vec<Range<usize>> {
    Regex::new(r"(?s)<!--.*?(?:-->|\z)")
        .map(|re| re.find_iter(html).map(|m| m.range()).collect())
        .unwrap_or_default()
}

fn in_comment(comments: &[Range<usize>], pos: usize) -> bool {
    comments.iter().any(|span| span.contains(&pos))
}

/// In-memory page keyed by container id, for exercising the loader.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryPage {
    pub containers: std::collections::BTreeMap<String, String>,
    pub writes: usize,
}

#[cfg(test)]
impl MemoryPage {
    pub fn with_containers(ids: &[&str]) -> Self {
        Self {
            containers: ids
                .iter()
                .map(|id| (id.to_string(), String::new()))
                .collect(),
            writes: 0,
        }
    }

    pub fn get(&self, id: &str) -> &str {
        self.containers.get(id).map(String::as_str).unwrap_or_default()
    }
}

#[cfg(test)]
impl Page for MemoryPage {
    fn has_container(&self, id: &str) -> bool {
        self.containers.contains_key(id)
    }

    fn set_content(&mut self, id: &str, html: &str) -> crate::error::Result<()> {
        let slot = self
            .containers
            .get_mut(id)
            .ok_or_else(|| LoadError::binding(id))?;
        *slot = html.to_string();
        self.writes += 1;
        Ok(())
    }
}
