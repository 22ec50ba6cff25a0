//! File logging. The TUI owns the terminal, so log output goes to
//! `globetrek.log` under `$GLOBETREK_LOG_DIR` or the platform cache dir.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "globetrek=info,warn";
const VERBOSE_FILTER: &str = "globetrek=debug,info";

pub fn log_dir() -> Option<PathBuf> {
    std::env::var_os("GLOBETREK_LOG_DIR")
        .map(PathBuf::from)
        .or_else(|| dirs::cache_dir().map(|d| d.join("globetrek")))
}

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new(VERBOSE_FILTER);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Hold the returned guard until exit so
/// buffered lines are flushed; `None` means logging fell back to stderr.
pub fn init(verbose: bool) -> Option<WorkerGuard> {
    let dir = log_dir().filter(|d| match std::fs::create_dir_all(d) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Failed to create log directory {}: {}", d.display(), e);
            false
        }
    });

    let Some(dir) = dir else {
        // Warnings only, so the TUI is not scribbled over
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new("warn"))
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init();
        return None;
    };

    let appender = tracing_appender::rolling::never(&dir, "globetrek.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::registry()
        .with(filter(verbose))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false).with_target(true))
        .try_init();

    tracing::debug!(dir = %dir.display(), "logging initialized");
    Some(guard)
}
