use std::fs::OpenOptions;
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable overriding the log-file filter, e.g. `info` or
/// `plugindb_organiser=trace`.
pub const LOG_FILTER_ENV: &str = "FL_PLUGINDB_LOG";

/// Builds a subscriber that appends every event to `log_file`.
///
/// The returned guard flushes the background writer when dropped, so keep it
/// alive until the run is over. The subscriber is not installed; callers
/// decide its scope with `tracing::subscriber::set_default` or
/// `set_global_default`.
pub fn file_subscriber(log_file: &Path) -> std::io::Result<(impl Subscriber + Send + Sync, WorkerGuard)> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(filter)
        .finish();

    Ok((subscriber, guard))
}
