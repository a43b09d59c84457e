//! Load a markdown paper, split it into `# ` sections, and render each
//! section into the page container its title names.

pub mod binding;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod loader;
pub mod logger;
pub mod page;
pub mod render;
pub mod section;
pub mod source;

pub use binding::{Binding, BindingTable};
pub use error::LoadError;
pub use loader::{LoadReport, SectionLoader};
pub use page::{HtmlPage, Page};
pub use render::{MarkdownRenderer, Renderer};
pub use source::DocumentSource;
