use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, Sink, StdStream, StdStreamSink};
use spdlog::{error, Level, LevelFilter, Logger};

use crate::config::{Config, Log, LogLevel};

/// Base name of the daily files written inside `[log] location`.
pub const LOG_FILE_NAME: &str = "folio.log";
const KEPT_LOG_FILES: usize = 60;

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        let level = match self {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        };
        LevelFilter::MoreSevereEqual(level)
    }
}

/// Info and below go to stdout, warnings and errors to stderr.
fn console_sinks() -> spdlog::Result<Vec<Arc<dyn Sink>>> {
    let stdout = StdStreamSink::builder()
        .std_stream(StdStream::Stdout)
        .level_filter(LevelFilter::MoreVerbose(Level::Warn))
        .build()?;
    let stderr = StdStreamSink::builder()
        .std_stream(StdStream::Stderr)
        .level_filter(LevelFilter::MoreSevereEqual(Level::Warn))
        .build()?;

    Ok(vec![Arc::new(stdout), Arc::new(stderr)])
}

fn log_file_path(location: &Path) -> PathBuf {
    location.join(LOG_FILE_NAME)
}

fn build_file_logger(log: &Log, location: &Path) -> spdlog::Result<Arc<Logger>> {
    if let Err(e) = fs::create_dir_all(location) {
        error!("Error creating log directory {}: {}", location.display(), e);
    }

    let daily_sink = RotatingFileSink::builder()
        .base_path(log_file_path(location))
        .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
        .max_files(KEPT_LOG_FILES)
        .rotate_on_open(false)
        .build()?;

    let mut builder = Logger::builder();
    builder.sink(Arc::new(daily_sink));
    if log.log_to_console {
        for sink in console_sinks()? {
            builder.sink(sink);
        }
    }

    let logger = Arc::new(builder.build()?);
    logger.set_level_filter(log.level.as_filter());
    logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Warn));
    logger.set_flush_period(Some(Duration::from_secs(2)));
    Ok(logger)
}

/// Applies the `[log]` section. Without it the default console logger is kept as is.
/// With a `location`, the default logger is replaced by one writing daily files there.
pub fn configure_logger(config: &Config) -> spdlog::Result<()> {
    let Some(ref log) = config.log else {
        return Ok(());
    };

    match log.location {
        Some(ref location) => spdlog::set_default_logger(build_file_logger(log, location)?),
        None => spdlog::default_logger().set_level_filter(log.level.as_filter()),
    }
    Ok(())
}
