//! Core logger trait

use crate::format::{self, Args};
use crate::{Level, Record};
use std::error::Error as StdError;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

/// Core logger trait - implemented by every backend's named loggers
pub trait Logger: Send + Sync + 'static {
    /// The stable name this logger was created with
    fn name(&self) -> &str;

    /// Emit a rendered record. Only called for levels that passed
    /// [`Logger::is_enabled`].
    fn log(&self, record: &Record<'_>);

    /// Flush any buffered logs
    fn flush(&self) {}

    /// Check if a level is enabled (for fast filtering)
    #[inline(always)]
    fn is_enabled(&self, level: Level) -> bool {
        level.is_enabled_static()
    }
}

macro_rules! level_methods {
    (
        $level:ident, $label:literal,
        $is_enabled:ident, $msg:ident, $fmt1:ident, $fmt2:ident, $fmt:ident, $err:ident
    ) => {
        #[doc = concat!("Is the logger enabled for the ", $label, " level?")]
        #[inline(always)]
        fn $is_enabled(&self) -> bool {
            self.is_enabled_for(Level::$level)
        }

        #[doc = concat!("Log a message at the ", $label, " level.")]
        #[inline(always)]
        fn $msg(&self, message: &str) {
            self.dispatch(Level::$level, message, Args::None, None);
        }

        #[doc = concat!("Log at the ", $label, " level with one template argument.")]
        #[inline(always)]
        fn $fmt1(&self, template: &str, arg: &dyn Display) {
            self.dispatch(Level::$level, template, Args::One(arg), None);
        }

        #[doc = concat!("Log at the ", $label, " level with two template arguments.")]
        #[inline(always)]
        fn $fmt2(&self, template: &str, a: &dyn Display, b: &dyn Display) {
            self.dispatch(Level::$level, template, Args::Two(a, b), None);
        }

        #[doc = concat!("Log at the ", $label, " level with any number of template arguments.")]
        #[inline(always)]
        fn $fmt(&self, template: &str, args: &[&dyn Display]) {
            self.dispatch(Level::$level, template, Args::Many(args), None);
        }

        #[doc = concat!("Log a message and an error at the ", $label, " level.")]
        #[inline(always)]
        fn $err(&self, message: &str, error: &(dyn StdError + 'static)) {
            self.dispatch(Level::$level, message, Args::None, Some(error));
        }
    };
}

/// Extension trait for convenient logging methods
///
/// Every method gates on [`LoggerExt::is_enabled_for`] before formatting, so a
/// disabled call never renders its template or touches its arguments.
pub trait LoggerExt: Logger {
    /// Combined compile-time and runtime gate. A panicking backend gate
    /// reports the level as disabled.
    #[inline(always)]
    fn is_enabled_for(&self, level: Level) -> bool {
        level.is_enabled_static()
            && panic::catch_unwind(AssertUnwindSafe(|| self.is_enabled(level))).unwrap_or(false)
    }

    /// Gate, render and forward a single record.
    ///
    /// Panics raised while rendering arguments or inside the backend are
    /// contained here and never reach the caller.
    fn dispatch(
        &self,
        level: Level,
        template: &str,
        args: Args<'_>,
        error: Option<&(dyn StdError + 'static)>,
    ) {
        if !self.is_enabled_for(level) {
            return;
        }

        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let message = format::render(template, args);
            let mut record = Record::new(level, self.name(), message);
            if !args.is_empty() {
                record = record.with_template(template, args);
            }
            if let Some(error) = error {
                record = record.with_error(error);
            }
            self.log(&record);
        }));
    }

    /// Log a message at an explicit level
    #[inline(always)]
    fn log_message(&self, level: Level, message: &str) {
        self.dispatch(level, message, Args::None, None);
    }

    /// Log at an explicit level with one template argument
    #[inline(always)]
    fn log_fmt1(&self, level: Level, template: &str, arg: &dyn Display) {
        self.dispatch(level, template, Args::One(arg), None);
    }

    /// Log at an explicit level with two template arguments
    #[inline(always)]
    fn log_fmt2(&self, level: Level, template: &str, a: &dyn Display, b: &dyn Display) {
        self.dispatch(level, template, Args::Two(a, b), None);
    }

    /// Log at an explicit level with any number of template arguments
    #[inline(always)]
    fn log_fmt(&self, level: Level, template: &str, args: &[&dyn Display]) {
        self.dispatch(level, template, Args::Many(args), None);
    }

    /// Log a message and an error at an explicit level
    #[inline(always)]
    fn log_err(&self, level: Level, message: &str, error: &(dyn StdError + 'static)) {
        self.dispatch(level, message, Args::None, Some(error));
    }

    level_methods!(Trace, "TRACE", is_trace_enabled, trace, trace_fmt1, trace_fmt2, trace_fmt, trace_err);
    level_methods!(Debug, "DEBUG", is_debug_enabled, debug, debug_fmt1, debug_fmt2, debug_fmt, debug_err);
    level_methods!(Info, "INFO", is_info_enabled, info, info_fmt1, info_fmt2, info_fmt, info_err);
    level_methods!(Warn, "WARN", is_warn_enabled, warn, warn_fmt1, warn_fmt2, warn_fmt, warn_err);
    level_methods!(Error, "ERROR", is_error_enabled, error, error_fmt1, error_fmt2, error_fmt, error_err);
}

// Implement for all loggers
impl<T: Logger + ?Sized> LoggerExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::fmt;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct TestLogger {
        threshold: Level,
        records: Mutex<Vec<(Level, String, Option<String>)>>,
    }

    impl TestLogger {
        fn new(threshold: Level) -> Self {
            Self {
                threshold,
                records: Mutex::new(Vec::new()),
            }
        }

        fn messages(&self) -> Vec<String> {
            self.records.lock().iter().map(|(_, m, _)| m.clone()).collect()
        }
    }

    impl Logger for TestLogger {
        fn name(&self) -> &str {
            "test"
        }

        fn log(&self, record: &Record<'_>) {
            self.records.lock().push((
                record.level,
                record.message.to_string(),
                record.error_text(),
            ));
        }

        fn is_enabled(&self, level: Level) -> bool {
            level >= self.threshold
        }
    }

    /// Counts how many times it is formatted.
    struct Counted(Arc<AtomicUsize>);

    impl fmt::Display for Counted {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.fetch_add(1, Ordering::SeqCst);
            f.write_str("counted")
        }
    }

    #[test]
    fn test_threshold_gates_every_pair() {
        for threshold in Level::ALL {
            let logger = TestLogger::new(threshold);
            for level in Level::ALL {
                assert_eq!(logger.is_enabled_for(level), level >= threshold);
            }
            assert_eq!(logger.is_trace_enabled(), Level::Trace >= threshold);
            assert_eq!(logger.is_debug_enabled(), Level::Debug >= threshold);
            assert_eq!(logger.is_info_enabled(), Level::Info >= threshold);
            assert_eq!(logger.is_warn_enabled(), Level::Warn >= threshold);
            assert!(logger.is_error_enabled());
        }
    }

    #[test]
    fn test_convenience_methods_route_by_level() {
        let logger = TestLogger::new(Level::Trace);
        logger.trace("t");
        logger.debug("d");
        logger.info("i");
        logger.warn("w");
        logger.error("e");

        let levels: Vec<Level> = logger.records.lock().iter().map(|(l, _, _)| *l).collect();
        assert_eq!(levels, Level::ALL.to_vec());
    }

    #[test]
    fn test_disabled_calls_never_format() {
        let counter = Arc::new(AtomicUsize::new(0));
        let arg = Counted(counter.clone());
        let logger = TestLogger::new(Level::Warn);

        logger.debug_fmt1("{}", &arg);
        logger.info_fmt2("{} {}", &arg, &arg);
        logger.trace_fmt("{}", &[&arg]);
        logger.log_fmt1(Level::Info, "{}", &arg);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(logger.messages().is_empty());

        logger.warn_fmt1("{}", &arg);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(logger.messages(), vec!["counted".to_string()]);
    }

    #[test]
    fn test_two_arg_and_variadic_render_identically() {
        let logger = TestLogger::new(Level::Trace);
        logger.warn_fmt2("a={} b={}", &1, &"two");
        logger.warn_fmt("a={} b={}", &[&1, &"two"]);
        logger.log_fmt2(Level::Warn, "a={} b={}", &1, &"two");

        let messages = logger.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m == "a=1 b=two"));
    }

    #[test]
    fn test_exactly_one_record_per_enabled_call() {
        let logger = TestLogger::new(Level::Info);
        logger.info("one");
        logger.info_fmt1("{}", &2);
        logger.log_message(Level::Error, "three");
        logger.debug("skipped");
        assert_eq!(logger.records.lock().len(), 3);
    }

    #[test]
    fn test_error_variant_carries_error() {
        let logger = TestLogger::new(Level::Info);
        let error = io::Error::other("disk full");
        logger.error_err("boom", &error);
        logger.log_err(Level::Debug, "hidden", &error);

        let records = logger.records.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].1, "boom");
        assert_eq!(records[0].2.as_deref(), Some("disk full"));
    }

    #[test]
    fn test_panicking_argument_is_contained() {
        struct Explodes;
        impl fmt::Display for Explodes {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                panic!("display exploded");
            }
        }

        let logger = TestLogger::new(Level::Info);
        logger.info_fmt1("{}", &Explodes);
        logger.info("still logging");
        assert_eq!(logger.messages(), vec!["still logging".to_string()]);
    }

    #[test]
    fn test_panicking_gate_is_contained() {
        struct BrokenGate;
        impl Logger for BrokenGate {
            fn name(&self) -> &str {
                "broken-gate"
            }
            fn log(&self, _: &Record<'_>) {
                panic!("log reached past a failed gate");
            }
            fn is_enabled(&self, _: Level) -> bool {
                panic!("gate exploded");
            }
        }

        let logger: Arc<dyn Logger> = Arc::new(BrokenGate);
        assert!(!logger.is_info_enabled());
        assert!(!logger.is_enabled_for(Level::Error));
        logger.info("x");
        logger.error_fmt1("y={}", &1);
    }

    #[test]
    fn test_works_through_trait_object() {
        let logger: Arc<dyn Logger> = Arc::new(TestLogger::new(Level::Info));
        logger.info_fmt1("y={}", &5);
        assert!(logger.is_info_enabled());
        assert!(!logger.is_debug_enabled());
        assert_eq!(logger.name(), "test");
    }
}
