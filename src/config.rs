use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::binding::{Binding, BindingTable};

pub const DEFAULT_SOURCE: &str = "docs/research_paper.md";
pub const DEFAULT_PAGE: &str = "templates/index.html";

const PROJECT_CONFIG: &str = ".paperpage.yaml";

/// Top-level configuration, read from YAML.
///
/// Every field is optional; accessors fill in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path or http(s) URL of the markdown document.
    #[serde(default)]
    pub source: Option<String>,

    /// HTML template holding the containers.
    #[serde(default)]
    pub page: Option<PathBuf>,

    /// Request timeout for http(s) sources. Unset waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Keyword bindings in priority order. Replaces the defaults when set.
    #[serde(default)]
    pub bindings: Option<Vec<Binding>>,

    #[serde(default)]
    pub markdown: MarkdownConfig,
}

/// Markdown extensions handed to the renderer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkdownConfig {
    #[serde(default)]
    pub tables: Option<bool>,
    #[serde(default)]
    pub strikethrough: Option<bool>,
    #[serde(default)]
    pub footnotes: Option<bool>,
    #[serde(default)]
    pub tasklists: Option<bool>,
}

impl MarkdownConfig {
    pub fn tables(&self) -> bool {
        self.tables.unwrap_or(true)
    }

    pub fn strikethrough(&self) -> bool {
        self.strikethrough.unwrap_or(true)
    }

    pub fn footnotes(&self) -> bool {
        self.footnotes.unwrap_or(false)
    }

    pub fn tasklists(&self) -> bool {
        self.tasklists.unwrap_or(false)
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `.paperpage.yaml` in the
    /// current directory is tried, then `~/.config/paperpage/config.yaml`.
    /// If neither exists the defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        for candidate in Self::search_paths() {
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }

        debug!("config:no file found, using defaults");
        Ok(Self::default())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(PROJECT_CONFIG)];
        if let Some(home) = home::home_dir() {
            paths.push(home.join(".config").join("paperpage").join("config.yaml"));
        }
        paths
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "config:loaded");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        // An empty file deserializes to unit, not a mapping.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_SOURCE)
    }

    pub fn page(&self) -> &Path {
        self.page.as_deref().unwrap_or(Path::new(DEFAULT_PAGE))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn binding_table(&self) -> BindingTable {
        match &self.bindings {
            Some(bindings) => BindingTable::new(bindings.clone()),
            None => BindingTable::default(),
        }
    }
}
