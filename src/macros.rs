//! Format-style logging macros over a destination handle.
//!
//! Each macro takes the destination first and `format!` arguments after,
//! and yields the same `Result` as the underlying method call:
//!
//! ```ignore
//! let app = registry.get("/var/log/app");
//! logbuf::info!(app, "listening on {addr}")?;
//! logbuf::error!(app, "backend {name} down: {err}")?;
//! ```

/// Log a formatted message at an explicit [`Level`](crate::Level).
#[macro_export]
macro_rules! log_at {
    ($dest:expr, $level:expr, $($arg:tt)*) => {{
        let __msg = format!($($arg)*);
        $dest.write_leveled($level, &__msg)
    }};
}

/// Log a formatted message at [`Level::Debug`](crate::Level::Debug).
#[macro_export]
macro_rules! debug { ($dest:expr, $($arg:tt)*) => { $crate::log_at!($dest, $crate::Level::Debug, $($arg)*) } }

/// Log a formatted message at [`Level::Info`](crate::Level::Info).
#[macro_export]
macro_rules! info { ($dest:expr, $($arg:tt)*) => { $crate::log_at!($dest, $crate::Level::Info, $($arg)*) } }

/// Log a formatted message at [`Level::Warn`](crate::Level::Warn).
#[macro_export]
macro_rules! warn { ($dest:expr, $($arg:tt)*) => { $crate::log_at!($dest, $crate::Level::Warn, $($arg)*) } }

/// Log a formatted message at [`Level::Error`](crate::Level::Error).
#[macro_export]
macro_rules! error { ($dest:expr, $($arg:tt)*) => { $crate::log_at!($dest, $crate::Level::Error, $($arg)*) } }

/// Log a formatted message at [`Level::Fatal`](crate::Level::Fatal).
#[macro_export]
macro_rules! fatal { ($dest:expr, $($arg:tt)*) => { $crate::log_at!($dest, $crate::Level::Fatal, $($arg)*) } }

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use chrono::{Local, TimeZone};
    use tempfile::TempDir;

    use crate::clock::ManualClock;
    use crate::config::{DestinationConfig, TimestampMode};
    use crate::destination::Destination;
    use crate::level::{Level, LevelFilter};

    fn quiet_dest(dir: &TempDir) -> Destination {
        let clock = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
        ));
        let name = dir.path().join("app.log").to_str().unwrap().to_string();
        let config = DestinationConfig {
            timestamps: TimestampMode::None,
            ..DestinationConfig::default()
        };
        Destination::new(name, config, clock, None)
    }

    #[test]
    fn test_macros_format_and_tag() {
        let dir = TempDir::new().unwrap();
        let dest = quiet_dest(&dir);

        crate::info!(dest, "answer is {}", 42).unwrap();
        crate::error!(dest, "{}-{}", "a", "b").unwrap();
        crate::log_at!(dest, Level::Warn, "direct").unwrap();
        dest.flush().unwrap();

        let content = fs::read_to_string(dir.path().join("app.log.2025060110")).unwrap();
        assert_eq!(
            content,
            "[INFO] answer is 42\n[ERROR] a-b\n[WARN] direct\n"
        );
    }

    #[test]
    fn test_macros_respect_threshold() {
        let dir = TempDir::new().unwrap();
        let dest = quiet_dest(&dir);
        dest.set_level(LevelFilter::Error);

        crate::debug!(dest, "dropped {}", 1).unwrap();
        crate::fatal!(dest, "kept").unwrap();
        dest.flush().unwrap();

        let content = fs::read_to_string(dir.path().join("app.log.2025060110")).unwrap();
        assert_eq!(content, "[FATAL] kept\n");
    }
}
