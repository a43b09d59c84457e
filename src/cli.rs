use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "paperpage", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the document's sections into the page template.
    Render(RenderArgs),

    /// List the document's sections and the container each one binds to.
    Sections(SourceArgs),
}

#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// Markdown document path or http(s) URL. Overrides the config file.
    #[arg(short, long)]
    pub source: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// HTML template containing the target containers.
    #[arg(short, long)]
    pub page: Option<PathBuf>,

    /// Write the populated page here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
