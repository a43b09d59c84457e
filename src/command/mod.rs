pub mod render;
pub mod sections;

use anyhow::Result;

use crate::cli::SourceArgs;
use crate::config::Config;
use crate::loader::SectionLoader;
use crate::render::MarkdownRenderer;
use crate::source::{self, DocumentSource};

/// Document source from the CLI override, else the config file.
fn resolve_source(config: &Config, args: &SourceArgs) -> Result<Box<dyn DocumentSource>> {
    let location = args.source.as_deref().unwrap_or(config.source());
    Ok(source::from_location(location, config.timeout())?)
}

fn build_loader(config: &Config, args: &SourceArgs) -> Result<SectionLoader<MarkdownRenderer>> {
    Ok(SectionLoader::new(
        resolve_source(config, args)?,
        MarkdownRenderer::from_config(&config.markdown),
        config.binding_table(),
    ))
}
