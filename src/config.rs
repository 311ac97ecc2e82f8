//! Destination and registry configuration.
//!
//! Both structs deserialize from TOML-style tables with every field
//! optional; the defaults match the data model (hourly rotation, caching
//! on, keep everything, timestamped lines, accept every severity).
//!
//! # Example
//!
//! ```toml
//! flush_interval = "1s"
//!
//! [defaults]
//! level = "info"
//! rotation = "daily"
//! timestamps = "standard"
//! cache_enabled = true
//! keep_probability = 1.0
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::level::LevelFilter;
use crate::rotation::RotationPolicy;

/// Whether plain lines get a timestamp prefix.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TimestampMode {
    /// Lines are written exactly as given.
    None = 0,
    /// Lines are prefixed with an RFC 3339 millisecond timestamp (default).
    #[default]
    Standard = 1,
}

impl TimestampMode {
    /// Round-trip from the atomic representation stored on a destination.
    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::None,
            _ => Self::Standard,
        }
    }
}

/// Initial configuration for a destination.
///
/// Applied when the registry creates a destination for a new name; every
/// option can still be changed later through the destination's setters.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct DestinationConfig {
    /// Minimum severity accepted by leveled writes.
    /// Default: all
    pub level: LevelFilter,

    /// File rotation policy (hourly, daily).
    /// Default: hourly
    pub rotation: RotationPolicy,

    /// Timestamp prefix on plain lines (none, standard).
    /// Default: standard
    pub timestamps: TimestampMode,

    /// Buffer writes in memory until the next flush tick.
    /// Default: true
    pub cache_enabled: bool,

    /// Keep-probability for structured writes; >= 1.0 keeps everything.
    /// Default: 1.0
    pub keep_probability: f32,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::All,
            rotation: RotationPolicy::Hourly,
            timestamps: TimestampMode::Standard,
            cache_enabled: true,
            keep_probability: 1.0,
        }
    }
}

/// Configuration for a registry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Period of the background flush scheduler.
    /// Default: 1s
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,

    /// Configuration applied to newly created destinations.
    pub defaults: DestinationConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(1),
            defaults: DestinationConfig::default(),
        }
    }
}
