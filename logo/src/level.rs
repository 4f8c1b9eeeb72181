//! Severity levels and level-name resolution.
//!
//! Level names are matched exactly (`"DEBUG"`, `"INFO"`, `"WARNING"`,
//! `"ERROR"`, `"FATAL"`). Any other name, including lowercase spellings and
//! the empty string, resolves to [`Level::Info`]. Misconfiguration must never
//! stop a process from logging, so resolution is infallible.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Record severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Fatal,
    ];

    /// Resolve a configuration name; unknown names yield `Info`.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_default()
    }

    /// Strict lookup, `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "DEBUG" => Some(Level::Debug),
            "INFO" => Some(Level::Info),
            "WARNING" => Some(Level::Warning),
            "ERROR" => Some(Level::Error),
            "FATAL" => Some(Level::Fatal),
            _ => None,
        }
    }

    /// Lookup by the value written to a record's `level` key.
    pub fn parse_record_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == name)
    }

    /// Configuration name of this level.
    pub fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Value written to the `level` key of a record.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }

    /// Whether records at this level carry a stack trace.
    pub fn captures_stacktrace(self) -> bool {
        self >= Level::Error
    }

    /// Closest `log` crate filter. `Fatal` has no counterpart and maps to `Error`.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Level::Debug => log::LevelFilter::Trace,
            Level::Info => log::LevelFilter::Info,
            Level::Warning => log::LevelFilter::Warn,
            Level::Error | Level::Fatal => log::LevelFilter::Error,
        }
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warning,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}

impl From<String> for Level {
    fn from(name: String) -> Self {
        Level::from_name(&name)
    }
}

impl From<&str> for Level {
    fn from(name: &str) -> Self {
        Level::from_name(name)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Accepts configuration names and record names; anything else is `Info`.
impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Level::parse(&name)
            .or_else(|| Level::parse_record_name(&name))
            .unwrap_or_default())
    }
}
