use anyhow::Result;
use clap::Parser;

use paperpage::cli::{Cli, Command};
use paperpage::config::Config;
use paperpage::{command, logger};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logger::init(cli.verbose)?;

    let config = Config::load(cli.config.as_deref())?;

    // One task on the current thread; the document fetch is its only await.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Command::Render(args) => command::render::run(&config, args).await,
            Command::Sections(args) => command::sections::run(&config, args).await,
        }
    })
}
