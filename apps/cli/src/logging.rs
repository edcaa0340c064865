//! Logging initialization for the vs-differ binary
//!
//! Console output plus a log file under the data folder, human-readable or
//! JSON. `RUST_LOG` overrides the configured level.

use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file_directory: PathBuf,
    pub file_prefix: String,
    /// `never`, `daily` or `hourly`
    pub file_rotation: String,
}

/// Keeps the file writer flushing; hold it until the program exits.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    let (file_writer, file_guard) = create_file_appender(config)?;
    let subscriber = tracing_subscriber::registry().with(build_env_filter(config));

    if config.json {
        let console_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr);
        let file_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(file_writer);
        subscriber.with(console_layer).with(file_layer).try_init()?;
    } else {
        let console_layer = fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr);
        let file_layer = fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(file_writer);
        subscriber.with(console_layer).with(file_layer).try_init()?;
    }

    tracing::debug!(
        directory = %config.file_directory.display(),
        rotation = %config.file_rotation,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)))
}

fn default_directives(level: &str) -> String {
    ["vs_differ", "vsdiff_compare", "vsdiff_package", "vsdiff_tx_client", "vsdiff_models"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn create_file_appender(config: &LoggingConfig) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(&config.file_directory)?;

    let directory = &config.file_directory;
    let prefix = &config.file_prefix;
    let file_appender = match config.file_rotation.as_str() {
        "daily" => tracing_appender::rolling::daily(directory, prefix),
        "hourly" => tracing_appender::rolling::hourly(directory, prefix),
        _ => tracing_appender::rolling::never(directory, format!("{prefix}.log")),
    };

    Ok(tracing_appender::non_blocking(file_appender))
}
