//! Adapter routing facade records into the `log` crate

use crate::backend::Backend;
use crate::{Level, Logger, Record};
use std::sync::Arc;

/// Backend that forwards every record to the installed `log::Log`.
///
/// The logger name becomes the `log` target; an attached error is appended
/// to the message.
#[derive(Debug, Clone, Copy)]
pub struct LogBackend {
    min_level: Level,
}

impl LogBackend {
    /// Name used in configuration and reports
    pub const NAME: &'static str = "log";

    /// Create a log backend with the given threshold
    #[must_use]
    pub const fn new(min_level: Level) -> Self {
        Self { min_level }
    }

    /// Capability probe: has a `log` implementation raised the max level?
    #[must_use]
    pub fn is_available() -> bool {
        log::max_level() != log::LevelFilter::Off
    }
}

impl Backend for LogBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn logger(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(LogLogger {
            name: Arc::from(name),
            min_level: self.min_level,
        })
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// Logger handed out by [`LogBackend`]
#[derive(Debug, Clone)]
pub struct LogLogger {
    name: Arc<str>,
    min_level: Level,
}

const fn to_log_level(level: Level) -> log::Level {
    match level {
        Level::Trace => log::Level::Trace,
        Level::Debug => log::Level::Debug,
        Level::Info => log::Level::Info,
        Level::Warn => log::Level::Warn,
        Level::Error => log::Level::Error,
    }
}

impl Logger for LogLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, record: &Record<'_>) {
        let message = record.full_message();
        log::logger().log(
            &log::Record::builder()
                .args(format_args!("{message}"))
                .level(to_log_level(record.level))
                .target(&self.name)
                .build(),
        );
    }

    fn flush(&self) {
        log::logger().flush();
    }

    #[inline]
    fn is_enabled(&self, level: Level) -> bool {
        level.passes(self.min_level)
            && level.is_enabled_static()
            && log::log_enabled!(target: &self.name, to_log_level(level))
    }
}
