//! # Structured Logging Module
//!
//! Console output plus, when `log_dir` is configured, a daily rotated JSON log
//! file for following status reports through ingestion.

use crate::config::LoggingConfig;
use std::fs;
use std::process;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();
static FILE_WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "mission-run.log";

/// Initialize structured logging. Later calls are no-ops, and an already
/// installed global subscriber is left in place.
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let log_level = effective_level(config);

        let console = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .boxed()
        };

        let mut file_error = None;
        let file = config.log_dir.as_ref().and_then(|log_dir| {
            if let Err(err) = fs::create_dir_all(log_dir) {
                file_error = Some(format!("{}: {err}", log_dir.display()));
                return None;
            }
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_WRITER_GUARD.set(guard);
            Some(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_ansi(false)
                    .json(),
            )
        });

        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
            .with(console)
            .with(file);

        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized, keeping it");
        }

        if let Some(error) = file_error {
            tracing::warn!(error = %error, "Could not create log directory, logging to console only");
        }

        tracing::info!(
            pid = process::id(),
            level = %log_level,
            log_dir = ?config.log_dir,
            "Structured logging initialized"
        );
    });
}

/// Configured filter directive, or `info` when the loader left it unset
fn effective_level(config: &LoggingConfig) -> String {
    config
        .level
        .as_deref()
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or("info")
        .to_string()
}
