//! Severity levels and gating

use crate::error::Error;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log severity, ordered `Trace < Debug < Info < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Level {
    /// Very fine-grained diagnostic detail
    Trace = 0,
    /// Debugging information
    Debug = 1,
    /// General operational messages
    Info = 2,
    /// Something unexpected that the process can recover from
    Warn = 3,
    /// A failed operation
    Error = 4,
}

/// Lowest level compiled in, or `None` when logging is compiled out entirely.
const STATIC_THRESHOLD: Option<Level> = if cfg!(feature = "max-level-off") {
    None
} else if cfg!(feature = "max-level-error") {
    Some(Level::Error)
} else if cfg!(feature = "max-level-warn") {
    Some(Level::Warn)
} else if cfg!(feature = "max-level-info") {
    Some(Level::Info)
} else if cfg!(feature = "max-level-debug") {
    Some(Level::Debug)
} else {
    Some(Level::Trace)
};

impl Level {
    /// All levels in ascending order.
    pub const ALL: [Self; 5] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
    ];

    /// Upper-case name used in rendered output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    /// Whether `self` passes the given runtime threshold.
    #[inline(always)]
    #[must_use]
    pub const fn passes(self, threshold: Self) -> bool {
        self as u8 >= threshold as u8
    }

    /// Whether this level survives the compile-time ceiling chosen with the
    /// `max-level-*` features. Const, so disabled call sites fold away.
    #[inline(always)]
    #[must_use]
    pub const fn is_enabled_static(self) -> bool {
        match STATIC_THRESHOLD {
            Some(threshold) => self.passes(threshold),
            None => false,
        }
    }

    /// The compile-time threshold, if any level is compiled in at all.
    #[must_use]
    pub const fn static_threshold() -> Option<Self> {
        STATIC_THRESHOLD
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(Error::InvalidLevel(s.to_string())),
        }
    }
}

/// Accepts exactly what [`FromStr`] accepts, so config files and environment
/// variables agree.
impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
