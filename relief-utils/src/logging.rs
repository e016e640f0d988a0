use anyhow::{anyhow, Result};
use std::{fs::OpenOptions, io, path::Path};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global subscriber: human readable events on stderr filtered by `RUST_LOG`
/// (falling back to `default_filter`), plus JSON lines in `logfile` when given.
///
/// Keep the returned guard alive until exit, buffered file output is lost otherwise. With
/// `allow_existing` an already installed subscriber is left in place instead of being an error.
pub fn init_logging_with(
    default_filter: &str,
    logfile: Option<&Path>,
    allow_existing: bool,
) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| anyhow!("Invalid log filter '{}': {}", default_filter, e))?;

    let (json_layer, guard) = match logfile {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .map_err(|e| anyhow!("Failed to open log file {:?}: {}", path, e))?;
            let (writer, guard) = non_blocking::NonBlockingBuilder::default()
                .lossy(false)
                .finish(file);
            let layer = fmt::layer()
                .json()
                .with_span_list(true)
                .with_current_span(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let installed = registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(json_layer)
        .with(env_filter)
        .try_init();
    match installed {
        Ok(()) => Ok(guard),
        Err(_) if allow_existing => Ok(guard),
        Err(e) => Err(anyhow!("Failed to install logging: {}", e)),
    }
}

pub fn init_logging(logfile: Option<impl AsRef<Path>>) -> Result<Option<WorkerGuard>> {
    init_logging_with(
        DEFAULT_LOG_FILTER,
        logfile.as_ref().map(AsRef::as_ref),
        false,
    )
}

/// Like [`init_logging`] at `debug` level, tolerating repeated calls across tests.
pub fn init_test_logging(logfile: Option<impl AsRef<Path>>) -> Result<Option<WorkerGuard>> {
    init_logging_with("debug", logfile.as_ref().map(AsRef::as_ref), true)
}
