//! Facade configuration

use crate::backend::ConsoleStream;
use crate::error::{Error, Result};
use crate::Level;
use serde::{Deserialize, Serialize};

/// Environment variable holding the threshold level
pub const ENV_LEVEL: &str = "PROVEN_LOG_LEVEL";
/// Environment variable forcing a single backend candidate by name
pub const ENV_BACKEND: &str = "PROVEN_LOG_BACKEND";
/// Environment variable choosing the console stream (`stdout` / `stderr`)
pub const ENV_STREAM: &str = "PROVEN_LOG_STREAM";
/// Environment variable enabling ANSI colors on the console backend
pub const ENV_COLOR: &str = "PROVEN_LOG_COLOR";

/// Configuration applied when the registry resolves its backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FacadeConfig {
    /// Threshold every backend gates on
    pub level: Level,
    /// Restrict detection to the candidate with this name
    pub backend: Option<String>,
    /// Stream used by the console backend
    pub stream: ConsoleStream,
    /// ANSI level colors on the console backend
    pub color: bool,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            backend: None,
            stream: ConsoleStream::Stdout,
            color: false,
        }
    }
}

impl FacadeConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> FacadeConfigBuilder {
        FacadeConfigBuilder::new()
    }

    /// Read the configuration from `PROVEN_LOG_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unrecognised value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unrecognised value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(level) = lookup(ENV_LEVEL) {
            config.level = level.parse()?;
        }
        if let Some(backend) = lookup(ENV_BACKEND) {
            let backend = backend.trim();
            if !backend.is_empty() {
                config.backend = Some(backend.to_ascii_lowercase());
            }
        }
        if let Some(stream) = lookup(ENV_STREAM) {
            config.stream = stream.parse()?;
        }
        if let Some(color) = lookup(ENV_COLOR) {
            config.color = parse_flag(&color)?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::InvalidFlag(value.to_string())),
    }
}

/// Builder for [`FacadeConfig`]
#[derive(Debug, Clone, Default)]
pub struct FacadeConfigBuilder {
    config: FacadeConfig,
}

impl FacadeConfigBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the threshold level
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    /// Force a single backend candidate by name
    #[must_use]
    pub fn backend(mut self, name: impl Into<String>) -> Self {
        self.config.backend = Some(name.into());
        self
    }

    /// Choose the console stream
    #[must_use]
    pub fn stream(mut self, stream: ConsoleStream) -> Self {
        self.config.stream = stream;
        self
    }

    /// Enable or disable console colors
    #[must_use]
    pub fn color(mut self, color: bool) -> Self {
        self.config.color = color;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> FacadeConfig {
        self.config
    }
}
