//! Backend that discards everything

use crate::backend::Backend;
use crate::{Level, Logger, Record};
use std::sync::Arc;

/// A backend whose loggers are never enabled.
///
/// Selected with `backend = "noop"`; useful for benchmarks and for silencing a
/// process entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpBackend;

impl NoOpBackend {
    /// Name used in configuration and reports
    pub const NAME: &'static str = "noop";
}

impl Backend for NoOpBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn logger(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(NoOpLogger {
            name: Arc::from(name),
        })
    }
}

/// Logger handed out by [`NoOpBackend`]
#[derive(Debug, Clone)]
pub struct NoOpLogger {
    name: Arc<str>,
}

impl Logger for NoOpLogger {
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn log(&self, _record: &Record<'_>) {
        // Intentionally empty - discard all log messages
    }

    #[inline(always)]
    fn is_enabled(&self, _level: Level) -> bool {
        false
    }
}
