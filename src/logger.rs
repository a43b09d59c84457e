use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;

const LOG_ENV: &str = "PAPERPAGE_LOG";
const LOG_FILE_ENV: &str = "PAPERPAGE_LOG_FILE";

/// Install the global tracing subscriber.
///
/// Filter comes from `PAPERPAGE_LOG` (default `warn`, `debug` with
/// `--verbose`). Output goes to stderr, or to the file named by
/// `PAPERPAGE_LOG_FILE`. Keep the returned guard alive until exit so buffered
/// file output is flushed.
pub fn init(verbose: bool) -> Result<Option<WorkerGuard>> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), default_level))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false);

    match std::env::var_os(LOG_FILE_ENV) {
        Some(path) => {
            let path = Path::new(&path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("{} must name a file", LOG_FILE_ENV))?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            builder.with_writer(writer).with_ansi(false).init();
            Ok(Some(guard))
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            Ok(None)
        }
    }
}
