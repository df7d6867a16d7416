//! Telemetry and logging initialization.
//!
//! Sets up structured logging with tracing, as pretty text, JSON, or a
//! non-blocking file writer.

use crate::config::LoggingConfig;
use std::path::Path;
use std::sync::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// The file writer flushes on drop, so its guard lives for the whole process.
static LOG_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

/// Initialize logging from the node's logging section.
///
/// `RUST_LOG`, when set, overrides the configured level.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    match &config.log_file {
        Some(path) => init_telemetry_with_file(&config.level, path, config.format == "json"),
        None => init_telemetry(&config.level, config.format == "json"),
    }
}

fn filter(log_level: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(log_level)?),
    }
}

/// Initialize logging to stdout.
pub fn init_telemetry(log_level: &str, json_format: bool) -> anyhow::Result<()> {
    let filter = filter(log_level)?;

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .try_init()?;
    }

    Ok(())
}

/// Initialize logging to an append-only file.
pub fn init_telemetry_with_file(
    log_level: &str,
    log_file: &Path,
    json_format: bool,
) -> anyhow::Result<()> {
    let (subscriber, guard) = file_subscriber(log_level, log_file, json_format)?;
    subscriber.try_init()?;

    if let Ok(mut g) = LOG_GUARD.lock() {
        *g = Some(guard);
    }

    Ok(())
}

fn file_subscriber(
    log_level: &str,
    log_file: &Path,
    json_format: bool,
) -> anyhow::Result<(impl tracing::Subscriber + Send + Sync + 'static, WorkerGuard)> {
    let filter = filter(log_level)?;

    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let layer = if json_format {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(non_blocking)
            .boxed()
    } else {
        fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking)
            .boxed()
    };

    Ok((tracing_subscriber::registry().with(filter).with(layer), guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error_not_a_panic() {
        let config = LoggingConfig::default();
        let _ = init(&config);
        assert!(init(&config).is_err());
    }

    #[test]
    fn test_file_output_honors_json_format() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join("node.log");

        let (subscriber, guard) = file_subscriber("info", &path, true).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(votes = 3, "tally updated");
        });
        drop(guard);

        let contents = std::fs::read_to_string(&path).unwrap();
        let line = contents.lines().next().unwrap();
        let entry: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(entry["fields"]["message"], "tally updated");
        assert_eq!(entry["fields"]["votes"], 3);
    }
}
