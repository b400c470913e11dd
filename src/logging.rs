//! Logging setup.
//!
//! The terminal belongs to the UI, so log output goes to a file through a
//! non-blocking `tracing-appender` writer.  The filter defaults to
//! [`DEFAULT_FILTER`] and can be overridden with `RUST_LOG`.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "pokedex_tui=info";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("log path {0} has no file name")]
    NoFileName(PathBuf),
    #[error("failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to install global tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber, appending to `path`.
///
/// The returned guard flushes buffered lines when dropped; keep it alive for
/// the whole program.
pub fn init(path: &Path) -> Result<WorkerGuard, LoggingError> {
    let (dir, file_name) = split_log_path(path)?;
    fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let (writer, guard) = tracing_appender::non_blocking(rolling::never(&dir, file_name));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()?;

    tracing::info!(path = %path.display(), "logging initialized");
    Ok(guard)
}

/// Split a log file path into its directory (current directory when bare)
/// and file name.
fn split_log_path(path: &Path) -> Result<(PathBuf, OsString), LoggingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::NoFileName(path.to_path_buf()))?
        .to_os_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}
