//! Adapter routing facade records into `tracing`

use crate::backend::Backend;
use crate::{Level, Logger, Record};
use std::sync::Arc;

/// Backend that emits every record as a `tracing` event.
///
/// The logger name travels in a `logger` field and an attached error in an
/// `error` field; the rendered message is the event message.
///
/// `tracing` targets are fixed per call site, so every event uses
/// [`TracingBackend::TARGET`] rather than the logger name. Target directives
/// such as `EnvFilter`'s `proven_log_facade=debug` apply to all facade
/// loggers at once; per-logger thresholds belong in
/// [`FacadeConfig`](crate::FacadeConfig). The `log` backend, by contrast,
/// uses the logger name as its target.
#[derive(Debug, Clone, Copy)]
pub struct TracingBackend {
    min_level: Level,
}

impl TracingBackend {
    /// Name used in configuration and reports
    pub const NAME: &'static str = "tracing";

    /// Target of every event and `enabled!` check
    pub const TARGET: &'static str = "proven_log_facade";

    /// Create a tracing backend with the given threshold
    #[must_use]
    pub const fn new(min_level: Level) -> Self {
        Self { min_level }
    }

    /// Capability probe: has a global `tracing` subscriber been installed?
    #[must_use]
    pub fn is_available() -> bool {
        tracing::dispatcher::has_been_set()
    }
}

impl Backend for TracingBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn logger(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(TracingLogger {
            name: Arc::from(name),
            min_level: self.min_level,
        })
    }
}

/// Logger handed out by [`TracingBackend`]
#[derive(Debug, Clone)]
pub struct TracingLogger {
    name: Arc<str>,
    min_level: Level,
}

macro_rules! emit {
    ($level:expr, $logger:expr, $error:expr, $message:expr) => {
        match $error {
            Some(error) => tracing::event!(
                target: TracingBackend::TARGET,
                $level,
                logger = $logger,
                error = error,
                "{}",
                $message
            ),
            None => tracing::event!(
                target: TracingBackend::TARGET,
                $level,
                logger = $logger,
                "{}",
                $message
            ),
        }
    };
}

impl Logger for TracingLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, record: &Record<'_>) {
        let logger: &str = &self.name;
        let message: &str = &record.message;
        let error = record.error_text();
        let error = error.as_deref();

        match record.level {
            Level::Trace => emit!(tracing::Level::TRACE, logger, error, message),
            Level::Debug => emit!(tracing::Level::DEBUG, logger, error, message),
            Level::Info => emit!(tracing::Level::INFO, logger, error, message),
            Level::Warn => emit!(tracing::Level::WARN, logger, error, message),
            Level::Error => emit!(tracing::Level::ERROR, logger, error, message),
        }
    }

    #[inline]
    fn is_enabled(&self, level: Level) -> bool {
        if !(level.passes(self.min_level) && level.is_enabled_static()) {
            return false;
        }
        match level {
            Level::Trace => tracing::enabled!(target: TracingBackend::TARGET, tracing::Level::TRACE),
            Level::Debug => tracing::enabled!(target: TracingBackend::TARGET, tracing::Level::DEBUG),
            Level::Info => tracing::enabled!(target: TracingBackend::TARGET, tracing::Level::INFO),
            Level::Warn => tracing::enabled!(target: TracingBackend::TARGET, tracing::Level::WARN),
            Level::Error => tracing::enabled!(target: TracingBackend::TARGET, tracing::Level::ERROR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LoggerExt;
    use crate::test_support::tracing_capture::{CapturedEvent, capture};
    use std::io;

    #[test]
    fn test_tracing_backend_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TracingBackend>();
        assert_send_sync::<TracingLogger>();
    }

    #[test]
    fn test_events_carry_logger_and_message() {
        let events = capture(|| {
            let logger = TracingBackend::new(Level::Trace).logger("svc::api");
            logger.info_fmt2("{} {}", &"hello", &42);
            logger.trace("fine detail");
        });

        assert_eq!(
            events,
            vec![
                CapturedEvent {
                    level: tracing::Level::INFO,
                    message: "hello 42".to_string(),
                    logger: Some("svc::api".to_string()),
                    error: None,
                },
                CapturedEvent {
                    level: tracing::Level::TRACE,
                    message: "fine detail".to_string(),
                    logger: Some("svc::api".to_string()),
                    error: None,
                },
            ]
        );
    }

    #[test]
    fn test_error_field() {
        let events = capture(|| {
            let error = io::Error::other("timeout");
            TracingBackend::new(Level::Info)
                .logger("svc")
                .warn_err("request failed", &error);
        });

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, tracing::Level::WARN);
        assert_eq!(events[0].message, "request failed");
        assert_eq!(events[0].error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_threshold_applies_before_tracing() {
        let events = capture(|| {
            let logger = TracingBackend::new(Level::Warn).logger("svc");
            assert!(!logger.is_info_enabled());
            assert!(logger.is_error_enabled());
            logger.info("filtered");
            logger.error("kept");
        });

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "kept");
    }

    #[test]
    fn test_disabled_without_subscriber() {
        // No subscriber in scope: tracing reports every level disabled.
        let logger = TracingBackend::new(Level::Trace).logger("svc");
        let _guard = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
        assert!(!logger.is_error_enabled());
    }
}
