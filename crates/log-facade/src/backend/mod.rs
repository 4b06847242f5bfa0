//! Backend adapters
//!
//! A [`Backend`] is the process-wide engine the registry selects once. It
//! hands out named [`Logger`]s; those loggers carry the per-call gating and
//! forward rendered records to the engine.

mod console;
#[cfg(feature = "log-backend")]
mod log_adapter;
mod noop;
#[cfg(feature = "tracing-backend")]
mod tracing_adapter;

use crate::Logger;
use std::sync::Arc;

pub use console::{ConsoleBackend, ConsoleLogger, ConsoleStream};
#[cfg(feature = "log-backend")]
pub use log_adapter::{LogBackend, LogLogger};
pub use noop::{NoOpBackend, NoOpLogger};
#[cfg(feature = "tracing-backend")]
pub use tracing_adapter::{TracingBackend, TracingLogger};

/// A concrete logging engine the facade can route to.
pub trait Backend: Send + Sync + 'static {
    /// Identifier used in candidate lists, configuration and reports
    fn name(&self) -> &'static str;

    /// Create a ready logger bound to this backend
    fn logger(&self, name: &str) -> Arc<dyn Logger>;

    /// Flush anything the engine buffers
    fn flush(&self) {}
}
