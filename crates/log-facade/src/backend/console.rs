//! Built-in console backend, the guaranteed fallback

use crate::backend::Backend;
use crate::config::FacadeConfig;
use crate::error::Error;
use crate::{Level, Logger, Record};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Which standard stream the console backend writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStream {
    /// Standard output
    #[default]
    Stdout,
    /// Standard error
    Stderr,
}

impl FromStr for ConsoleStream {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            _ => Err(Error::InvalidStream(s.to_string())),
        }
    }
}

type Sink = Arc<Mutex<Box<dyn WriteColor + Send>>>;

/// Backend that writes one line per record to stdout or stderr:
/// `[timestamp] [LEVEL] [logger] message`.
#[derive(Clone)]
pub struct ConsoleBackend {
    /// Minimum log level
    min_level: Level,
    /// Lock for the stream (to prevent interleaving within a line)
    sink: Sink,
}

impl ConsoleBackend {
    /// Name used in configuration and reports
    pub const NAME: &'static str = "console";

    /// Create a console backend on the given stream
    #[must_use]
    pub fn new(min_level: Level, stream: ConsoleStream, color: bool) -> Self {
        let choice = if color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let writer = match stream {
            ConsoleStream::Stdout => StandardStream::stdout(choice),
            ConsoleStream::Stderr => StandardStream::stderr(choice),
        };
        Self::with_writer(min_level, Box::new(writer))
    }

    /// Create a console backend from the facade configuration
    #[must_use]
    pub fn from_config(config: &FacadeConfig) -> Self {
        Self::new(config.level, config.stream, config.color)
    }

    /// Create a console backend over an arbitrary writer
    #[must_use]
    pub fn with_writer(min_level: Level, writer: Box<dyn WriteColor + Send>) -> Self {
        Self {
            min_level,
            sink: Arc::new(Mutex::new(writer)),
        }
    }

    /// The threshold loggers from this backend gate on
    #[must_use]
    pub const fn min_level(&self) -> Level {
        self.min_level
    }
}

impl fmt::Debug for ConsoleBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleBackend")
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

impl Backend for ConsoleBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn logger(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(ConsoleLogger {
            name: Arc::from(name),
            min_level: self.min_level,
            sink: self.sink.clone(),
        })
    }

    fn flush(&self) {
        let _ = self.sink.lock().flush();
    }
}

/// Logger handed out by [`ConsoleBackend`]
pub struct ConsoleLogger {
    name: Arc<str>,
    min_level: Level,
    sink: Sink,
}

impl fmt::Debug for ConsoleLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleLogger")
            .field("name", &self.name)
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

const fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Blue,
        Level::Trace => Color::Magenta,
    }
}

impl Logger for ConsoleLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, record: &Record<'_>) {
        // Render outside the lock; write errors are swallowed.
        let timestamp = record.timestamp_rfc3339();
        let message = record.full_message();

        let mut stream = self.sink.lock();
        let _ = write!(stream, "[{timestamp}] [");
        let _ = stream.set_color(
            ColorSpec::new()
                .set_fg(Some(level_color(record.level)))
                .set_bold(true),
        );
        let _ = write!(stream, "{}", record.level);
        let _ = stream.reset();
        let _ = writeln!(stream, "] [{}] {message}", record.logger);
        let _ = stream.flush();
    }

    fn flush(&self) {
        let _ = self.sink.lock().flush();
    }

    #[inline(always)]
    fn is_enabled(&self, level: Level) -> bool {
        level.passes(self.min_level) && level.is_enabled_static()
    }
}
