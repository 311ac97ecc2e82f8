//! Message severities and destination thresholds.
//!
//! A [`Level`] classifies a single message; a [`LevelFilter`] is the
//! per-destination threshold it is checked against. The two extra filter
//! values `All` and `Off` sit below and above the severity range so a
//! destination can accept or reject everything without special casing.

use serde::Deserialize;

/// Severity of a single leveled message.
///
/// Ordered: `Debug < Info < Warn < Error < Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// Diagnostic detail.
    Debug = 1,
    /// Normal operation.
    Info = 2,
    /// Something suspicious, not yet an error.
    Warn = 3,
    /// An operation failed.
    Error = 4,
    /// The process is in an unrecoverable state.
    Fatal = 5,
}

impl Level {
    /// Bracketed tag prefixed to leveled lines, e.g. `[INFO]`.
    #[inline]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Debug => "[DEBUG]",
            Self::Info => "[INFO]",
            Self::Warn => "[WARN]",
            Self::Error => "[ERROR]",
            Self::Fatal => "[FATAL]",
        }
    }

    /// Lowercase name, matching the configuration spelling of the
    /// corresponding [`LevelFilter`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

/// Minimum severity a destination accepts.
///
/// A message passes when its severity is at or above the filter; `All`
/// passes every message and `Off` passes none.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LevelFilter {
    /// Accept every severity (default).
    #[default]
    All = 0,
    /// Accept `Debug` and above.
    Debug = 1,
    /// Accept `Info` and above.
    Info = 2,
    /// Accept `Warn` and above.
    Warn = 3,
    /// Accept `Error` and above.
    Error = 4,
    /// Accept `Fatal` only.
    Fatal = 5,
    /// Accept nothing.
    Off = 6,
}

impl LevelFilter {
    /// Whether a message of the given severity passes this filter.
    #[inline]
    pub const fn accepts(self, level: Level) -> bool {
        level as u8 >= self as u8
    }

    /// Lowercase name as spelled in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Off => "off",
        }
    }

    /// Round-trip from the atomic representation stored on a destination.
    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Debug,
            2 => Self::Info,
            3 => Self::Warn,
            4 => Self::Error,
            5 => Self::Fatal,
            6 => Self::Off,
            _ => Self::All,
        }
    }
}
