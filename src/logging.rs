//! Logging for scaffolded applications.
//!
//! Two sinks are active at once: standard output and the application's log
//! file. Both render one line per event with rfc3339 timestamps and honor
//! `RUST_LOG`, defaulting to info. The file sink writes through a
//! non-blocking worker; its guard must stay alive until the final teardown
//! entry has been written and is dropped there to flush the file.

use std::fs::OpenOptions;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{Result, SoloistError};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber with stdout and file sinks.
///
/// Returns the guard that keeps the file worker flushing. When a global
/// subscriber is already installed, the existing one stays in charge and
/// `None` comes back; an embedding application keeps control of its own
/// logging that way.
pub fn init(log_path: &Path) -> Result<Option<WorkerGuard>> {
    let (writer, guard) = open_log_writer(log_path)?;
    let subscriber = tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(ChronoLocal::rfc_3339())
                .with_target(false),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(ChronoLocal::rfc_3339())
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        );
    match subscriber.try_init() {
        Ok(()) => Ok(Some(guard)),
        Err(_) => Ok(None),
    }
}

/// Builds a file-only subscriber over the same layer stack.
///
/// Used by tests to capture lifecycle output per test through
/// `tracing::subscriber::with_default` without touching global state.
#[cfg(test)]
pub(crate) fn file_subscriber(
    log_path: &Path,
) -> Result<(impl tracing::Subscriber + Send + Sync + use<>, WorkerGuard)> {
    let (writer, guard) = open_log_writer(log_path)?;
    let subscriber = tracing_subscriber::registry().with(EnvFilter::new("info")).with(
        tracing_subscriber::fmt::layer()
            .with_timer(ChronoLocal::rfc_3339())
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer),
    );
    Ok((subscriber, guard))
}

fn open_log_writer(
    log_path: &Path,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|source| SoloistError::Logging {
            path: log_path.to_path_buf(),
            source,
        })?;
    Ok(tracing_appender::non_blocking(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::info;

    #[test]
    fn test_unwritable_log_path_is_an_error() {
        let err = init(Path::new("/no/such/dir/app.log")).unwrap_err();
        assert!(matches!(err, SoloistError::Logging { .. }));
    }

    #[test]
    fn test_file_subscriber_captures_events() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("capture.log");
        let (subscriber, guard) = file_subscriber(&path).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            info!("Starting my-app");
            info!("Stopping my-app");
        });
        drop(guard);

        let content = std::fs::read_to_string(&path).unwrap();
        let starting = content.find("Starting my-app").unwrap();
        let stopping = content.find("Stopping my-app").unwrap();
        assert!(starting < stopping);
    }
}
