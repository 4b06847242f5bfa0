//! Logging facade with runtime backend detection
//!
//! Libraries log through [`LoggerFactory`] and the [`Logger`] / [`LoggerExt`]
//! traits without choosing an engine. On first use the registry probes the
//! available backends once (`tracing`, then `log`, after any explicitly
//! registered candidates) and falls back to a console backend when nothing is
//! installed.
//!
//! ```
//! use proven_log_facade::{LoggerExt, LoggerFactory};
//!
//! let logger = LoggerFactory::get("app::db");
//! if logger.is_debug_enabled() {
//!     logger.debug_fmt1("pool size {}", &8);
//! }
//! logger.info_fmt2("connected to {} in {}ms", &"primary", &12);
//! ```
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod macros;

pub mod backend;
pub mod config;
pub mod error;
pub mod factory;
pub mod format;
pub mod level;
pub mod logger;
pub mod record;
pub mod registry;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use backend::{Backend, ConsoleBackend, ConsoleStream, NoOpBackend};
#[cfg(feature = "log-backend")]
pub use backend::LogBackend;
#[cfg(feature = "tracing-backend")]
pub use backend::TracingBackend;
pub use config::{FacadeConfig, FacadeConfigBuilder};
pub use error::{Error, Result};
pub use factory::LoggerFactory;
pub use format::{Args, render, render_error_chain};
pub use level::Level;
pub use logger::{Logger, LoggerExt};
pub use record::{OwnedRecord, Record};
pub use registry::{Candidate, ProbeOutcome, ProbeReport, Registry, RegistryState, Resolution};
