//! Logging macros
//!
//! The level macros check the gate before any argument expression is
//! evaluated, so expensive arguments cost nothing when the level is off.

/// A logger named after the calling module
///
/// ```
/// let logger = proven_log_facade::logger!();
/// assert!(logger.name().ends_with(module_path!()));
/// ```
#[macro_export]
macro_rules! logger {
    () => {
        $crate::LoggerFactory::get(::core::module_path!())
    };
}

/// Log at an explicit level: `log!(logger, Level::Info, "x={}", x)`
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {{
        #[allow(unused_imports)]
        use $crate::LoggerExt as _;
        let logger = &$logger;
        let level: $crate::Level = $level;
        if logger.is_enabled_for(level) {
            logger.log_fmt(
                level,
                $template,
                &[$(&$arg as &dyn ::core::fmt::Display),*],
            );
        }
    }};
}

/// Log at the TRACE level
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Trace, $($rest)+)
    };
}

/// Log at the DEBUG level
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($rest)+)
    };
}

/// Log at the INFO level
#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($rest)+)
    };
}

/// Log at the WARN level
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($rest)+)
    };
}

/// Log at the ERROR level
#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($rest)+)
    };
}
