//! Console and file log sink.
//!
//! Library code logs through the `log` macros. `init` installs a tracing
//! subscriber that picks those records up and writes each one to stderr
//! and to `<exe_dir>/logs/heist_ledger.log`. Stdout is left to command
//! output.

use anyhow::{anyhow, Context, Result};
use std::io;
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::paths;

pub const LOG_FILE_NAME: &str = "heist_ledger.log";

/// Timestamp format of every log line.
const LOG_TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Builds the stderr + file subscriber.
fn build_subscriber<W>(level: LevelFilter, file_writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let timer = ChronoLocal::new(LOG_TIME_FORMAT.to_string());

    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(timer.clone())
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_timer(timer)
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(level)
}

/// Installs the global logger. `verbose` enables debug output.
pub fn init(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let file_writer = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(paths::get_logs_dir())
        .context("Failed to open log file")?;

    build_subscriber(level, file_writer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_layer_respects_level() {
        let dir = tempdir().unwrap();
        let file_writer = tracing_appender::rolling::never(dir.path(), LOG_FILE_NAME);
        let subscriber = build_subscriber(LevelFilter::INFO, file_writer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("Skipping row 3");
            tracing::debug!("hidden detail");
        });

        let content = std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
        assert!(content.contains("WARN"));
        assert!(content.contains("Skipping row 3"));
        assert!(!content.contains("hidden detail"));
    }

    #[test]
    fn test_debug_level_when_verbose() {
        let dir = tempdir().unwrap();
        let file_writer = tracing_appender::rolling::never(dir.path(), LOG_FILE_NAME);
        let subscriber = build_subscriber(LevelFilter::DEBUG, file_writer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("Compiled 3 term patterns");
        });

        let content = std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
        assert!(content.contains("DEBUG"));
        assert!(content.contains("Compiled 3 term patterns"));
    }
}
