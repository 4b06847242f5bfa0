//! Log record passed from the facade to a backend

use crate::Level;
use crate::format::{Args, render_error_chain};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// A rendered log record, borrowed from the dispatching call.
///
/// Records only live for the duration of one `Logger::log` call. Backends that
/// buffer or ship records elsewhere convert them with
/// [`Record::to_owned_record`].
#[derive(Clone)]
pub struct Record<'a> {
    /// Log level
    pub level: Level,
    /// Name of the logger that produced the record
    pub logger: &'a str,
    /// The template, for formatted calls
    pub template: Option<&'a str>,
    /// The arguments substituted into the template
    pub args: Args<'a>,
    /// The rendered message
    pub message: Cow<'a, str>,
    /// Error attached to the call, if any
    pub error: Option<&'a (dyn StdError + 'static)>,
    /// When the record was created
    pub timestamp: DateTime<Utc>,
}

impl<'a> Record<'a> {
    /// Create a message-only record.
    #[inline]
    pub fn new(level: Level, logger: &'a str, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            level,
            logger,
            template: None,
            args: Args::None,
            message: message.into(),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Builder-style method for recording the template and its arguments
    #[inline]
    #[must_use]
    pub fn with_template(mut self, template: &'a str, args: Args<'a>) -> Self {
        self.template = Some(template);
        self.args = args;
        self
    }

    /// Builder-style method for attaching an error
    #[inline]
    #[must_use]
    pub fn with_error(mut self, error: &'a (dyn StdError + 'static)) -> Self {
        self.error = Some(error);
        self
    }

    /// The attached error rendered with its cause chain.
    #[must_use]
    pub fn error_text(&self) -> Option<String> {
        self.error.map(render_error_chain)
    }

    /// The message with the error chain appended, for single-line sinks.
    #[must_use]
    pub fn full_message(&self) -> Cow<'_, str> {
        match self.error_text() {
            Some(error) => Cow::Owned(format!("{}: {error}", self.message)),
            None => Cow::Borrowed(self.message.as_ref()),
        }
    }

    /// RFC 3339 timestamp with millisecond precision.
    #[must_use]
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Convert to an owned version (for retaining or sending across threads)
    #[must_use]
    pub fn to_owned_record(&self) -> OwnedRecord {
        OwnedRecord {
            level: self.level,
            logger: self.logger.to_string(),
            template: self.template.map(str::to_string),
            message: self.message.clone().into_owned(),
            error: self.error_text(),
            timestamp: self.timestamp,
        }
    }
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("level", &self.level)
            .field("logger", &self.logger)
            .field("template", &self.template)
            .field("args", &self.args)
            .field("message", &self.message)
            .field("error", &self.error_text())
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Owned version of [`Record`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedRecord {
    /// Log level
    pub level: Level,
    /// Logger name
    pub logger: String,
    /// The template, for formatted calls
    pub template: Option<String>,
    /// The rendered message
    pub message: String,
    /// Rendered error chain, if an error was attached
    pub error: Option<String>,
    /// When the record was created
    pub timestamp: DateTime<Utc>,
}
