//! Entry point for obtaining loggers

use crate::config::FacadeConfig;
use crate::error::Result;
use crate::registry::{self, Candidate, Resolution};
use crate::Logger;
use std::sync::Arc;

/// Hands out named loggers bound to the process-wide backend.
///
/// The first call to [`LoggerFactory::get`] triggers backend detection;
/// every later call reuses the published selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerFactory;

impl LoggerFactory {
    /// A logger with the given name. Repeated calls with the same name return
    /// the same instance.
    #[must_use]
    pub fn get(name: &str) -> Arc<dyn Logger> {
        registry::global().logger(name)
    }

    /// A logger named after the type `T`
    #[must_use]
    pub fn for_type<T: ?Sized>() -> Arc<dyn Logger> {
        Self::get(std::any::type_name::<T>())
    }

    /// Install the configuration used when the backend is detected.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AlreadyResolved`] after the first logger was
    /// handed out.
    pub fn configure(config: FacadeConfig) -> Result<()> {
        registry::global().configure(config)
    }

    /// Register a backend candidate ahead of the built-ins.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AlreadyResolved`] after detection and
    /// [`crate::Error::DuplicateCandidate`] for a taken name.
    pub fn register(candidate: Candidate) -> Result<()> {
        registry::global().register(candidate)
    }

    /// Detect the backend now, if not done yet, and report what was chosen
    #[must_use]
    pub fn resolution() -> Arc<Resolution> {
        registry::global().resolve()
    }

    /// Flush the selected backend
    pub fn flush() {
        registry::global().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestLogGuard;
    use crate::{Error, Level, LoggerExt};
    use serial_test::serial;

    struct Widget;

    #[test]
    #[serial]
    fn test_get_caches_by_name() {
        let guard = TestLogGuard::new("test_get_caches_by_name");

        let a = LoggerFactory::get("app::service");
        let b = LoggerFactory::get("app::service");
        assert!(Arc::ptr_eq(&a, &b));

        a.info_fmt1("ready on port {}", &8080);
        assert!(guard.backend().contains("INFO [app::service] ready on port 8080"));
        assert_eq!(LoggerFactory::resolution().backend_name(), "capture");
    }

    #[test]
    #[serial]
    fn test_for_type_uses_type_name() {
        let guard = TestLogGuard::new("test_for_type_uses_type_name");

        let logger = LoggerFactory::for_type::<Widget>();
        assert!(logger.name().ends_with("factory::tests::Widget"));
        logger.warn("spinning");

        let records: Vec<_> = guard
            .backend()
            .records()
            .into_iter()
            .filter(|record| record.logger == logger.name())
            .collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Warn);
        assert_eq!(records[0].logger, logger.name());
    }

    #[test]
    #[serial]
    fn test_configuration_is_frozen_after_first_use() {
        let _guard = TestLogGuard::new("test_configuration_is_frozen_after_first_use");

        let _ = LoggerFactory::get("first");
        assert_eq!(
            LoggerFactory::configure(FacadeConfig::default()),
            Err(Error::AlreadyResolved)
        );
        LoggerFactory::flush();
    }
}
