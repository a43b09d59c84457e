use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Padding, Style, object::Columns},
};

use crate::cli::SourceArgs;
use crate::config::Config;
use crate::loader::{Assignment, assign};
use crate::source::fetch_text;

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "CONTAINER")]
    container: String,
    #[tabled(rename = "LINES")]
    lines: usize,
}

fn rows(assignments: &[Assignment<'_, '_>]) -> Vec<SectionRow> {
    assignments
        .iter()
        .map(|a| SectionRow {
            title: a.section.title.trim().to_string(),
            container: a
                .binding
                .map(|b| b.container.clone())
                .unwrap_or_else(|| "-".to_string()),
            lines: a.section.body.lines().count(),
        })
        .collect()
}

pub async fn run(config: &Config, args: SourceArgs) -> Result<()> {
    let source = super::resolve_source(config, &args)?;
    let document = fetch_text(source.as_ref()).await?;
    let bindings = config.binding_table();
    let assignments = assign(&document, &bindings);

    if assignments.is_empty() {
        println!("No sections found in {}", source.location());
        return Ok(());
    }

    let mut table = Table::new(rows(&assignments));
    table
        .with(Style::blank())
        .modify(Columns::new(0..2), Padding::new(0, 1, 0, 0));

    println!("{table}");

    Ok(())
}
