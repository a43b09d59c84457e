//! Where the markdown document comes from.
//!
//! A location starting with `http://` or `https://` is fetched over HTTP,
//! anything else is read as a local path.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::error::{LoadError, Result};

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Human readable location, used in errors and logs.
    fn location(&self) -> &str;

    /// Retrieve the raw document bytes.
    async fn fetch(&self) -> Result<Vec<u8>>;
}

/// Fetch the document and decode it as UTF-8.
pub async fn fetch_text(source: &dyn DocumentSource) -> Result<String> {
    let bytes = source.fetch().await?;
    debug!(location = source.location(), bytes = bytes.len(), "source:fetched");
    String::from_utf8(bytes).map_err(|source_err| LoadError::Decode {
        location: source.location().to_string(),
        source: source_err,
    })
}

/// Pick a source implementation for `location`.
pub fn from_location(location: &str, timeout: Option<Duration>) -> Result<Box<dyn DocumentSource>> {
    if is_url(location) {
        Ok(Box::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}

fn is_url(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Local file.
pub struct FileSource {
    path: PathBuf,
    display: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display = path.display().to_string();
        Self { path, display }
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    fn location(&self) -> &str {
        &self.display
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| LoadError::fetch(&self.display, e))
    }
}

/// Document served over http(s).
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let url = url.into();
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| LoadError::fetch(&url, e))?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LoadError::fetch(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::fetch(&self.url, format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| LoadError::fetch(&self.url, e))?;
        Ok(body.to_vec())
    }
}
