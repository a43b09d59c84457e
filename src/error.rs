//! Error taxonomy for the section loader.
//!
//! CLI and config code use `anyhow`; only failures inside the load pipeline
//! are typed, so the top level can tell them apart when reporting.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    /// Resource unreachable or transport failure.
    #[error("failed to fetch '{location}': {message}")]
    Fetch { location: String, message: String },

    /// Body could not be decoded as text.
    #[error("'{location}' is not valid UTF-8 text: {source}")]
    Decode {
        location: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Renderer rejected a section body.
    #[error("failed to render section '{section}': {source}")]
    Render {
        section: String,
        #[source]
        source: RenderError,
    },

    /// Target container is not present on the page.
    #[error("page has no container with id '{container}'")]
    Binding { container: String },
}

/// Raised by a renderer that refuses its input.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct RenderError(pub String);

impl LoadError {
    pub fn fetch(location: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Fetch {
            location: location.into(),
            message: message.to_string(),
        }
    }

    pub fn binding(container: impl Into<String>) -> Self {
        Self::Binding {
            container: container.into(),
        }
    }

    /// Short name of the failure class, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Decode { .. } => "decode",
            Self::Render { .. } => "render",
            Self::Binding { .. } => "binding",
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
