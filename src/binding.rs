//! Keyword to container bindings.
//!
//! Bindings are checked in order against the lowercased section title and the
//! first one whose keyword appears in it wins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Case-insensitive substring looked for in the section title.
    pub keyword: String,
    /// Id of the page element that receives the rendered section.
    pub container: String,
    /// Heading emitted as `<h2>` before the rendered body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Binding {
    pub fn new(keyword: &str, container: &str) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
            container: container.to_string(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    fn matches(&self, lowered_title: &str) -> bool {
        lowered_title.contains(&self.keyword)
    }

    /// Final HTML written to the container for an already rendered body.
    pub fn decorate(&self, rendered: &str) -> String {
        match &self.label {
            Some(label) => format!("<h2>{}</h2>\n{}", escape_text(label), rendered),
            None => rendered.to_string(),
        }
    }
}

/// Ordered set of bindings; order is priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::new(vec![
            Binding::new("abstract", "abstract").with_label("Abstract"),
            Binding::new("methodology", "methodology"),
            Binding::new("results", "results"),
        ])
    }
}

impl BindingTable {
    /// Keywords are normalized to lowercase; empty keywords would match every
    /// title and are dropped.
    pub fn new(bindings: Vec<Binding>) -> Self {
        let bindings = bindings
            .into_iter()
            .filter(|b| !b.keyword.trim().is_empty())
            .map(|b| Binding {
                keyword: b.keyword.to_lowercase(),
                ..b
            })
            .collect();
        Self { bindings }
    }

    /// First binding whose keyword occurs in `title`, ignoring case.
    pub fn resolve(&self, title: &str) -> Option<&Binding> {
        let lowered = title.to_lowercase();
        self.bindings.iter().find(|b| b.matches(&lowered))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    match pulldown_cmark_escape::escape_html(&mut out, text) {
        Ok(()) => out,
        Err(_) => unreachable!("writing to a String cannot fail"),
    }
}
