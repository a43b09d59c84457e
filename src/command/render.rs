use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;

use crate::cli::RenderArgs;
use crate::config::Config;
use crate::page::HtmlPage;

/// Populate the page template and write it out.
///
/// A failed load is logged and the page is still written, with its
/// containers left as they were in the template.
pub async fn run(config: &Config, args: RenderArgs) -> Result<()> {
    let loader = super::build_loader(config, &args.source)?;

    let page_path = args.page.as_deref().unwrap_or(config.page());
    let mut page = HtmlPage::load(page_path)?;

    if let Some(report) = loader.run(&mut page).await {
        for skipped in &report.skipped {
            info!(title = %skipped, "render:section has no container");
        }
    }

    match &args.output {
        Some(path) => std::fs::write(path, page.as_str())
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(page.as_str().as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
