//! Time-bucketed file rotation.
//!
//! A destination writes to `<name>.<suffix>` where the suffix is derived
//! from the current local time at flush or direct-write time, never at
//! append time. Rotation is lazy: nothing happens at the boundary itself,
//! the stale handle is simply replaced the next time a write resolves the
//! suffix and notices the mismatch.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Deserialize;

/// How often a destination switches to a new file.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum RotationPolicy {
    /// One file per hour: `name.YYYYMMDDHH` (default).
    #[default]
    Hourly = 0,
    /// One file per calendar day: `name.YYYYMMDD`.
    Daily = 1,
}

impl RotationPolicy {
    /// Suffix format string for this policy.
    const fn suffix_format(self) -> &'static str {
        match self {
            Self::Hourly => "%Y%m%d%H",
            Self::Daily => "%Y%m%d",
        }
    }

    /// Resolve the file suffix for the given instant.
    pub fn suffix(self, now: DateTime<Local>) -> String {
        now.format(self.suffix_format()).to_string()
    }

    /// Round-trip from the atomic representation stored on a destination.
    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Daily,
            _ => Self::Hourly,
        }
    }
}

/// The currently open rotated file and the suffix it was opened for.
///
/// The handle is valid only while the resolved suffix for "now" equals
/// [`FileSlot::suffix`]; callers hold the slot behind a mutex and call
/// [`FileSlot::ensure_open`] before every write through it.
#[derive(Debug, Default)]
pub(crate) struct FileSlot {
    suffix: String,
    file: Option<File>,
}

impl FileSlot {
    /// Make sure the slot holds a handle for the bucket current at `now`.
    ///
    /// Reuses the cached handle when the suffix still matches. Otherwise
    /// opens `<base>.<suffix>` (create + append, parent directories
    /// created as needed), retrying once immediately on failure, and drops
    /// the previous handle. Returns whether a rotation happened.
    pub(crate) fn ensure_open(
        &mut self,
        base: &Path,
        policy: RotationPolicy,
        now: DateTime<Local>,
    ) -> io::Result<bool> {
        let suffix = policy.suffix(now);
        if suffix == self.suffix && self.file.is_some() {
            return Ok(false);
        }

        let path = rotated_path(base, &suffix);
        let file = match open_append(&path) {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "open failed, retrying");
                open_append(&path)?
            }
        };
        tracing::debug!(path = %path.display(), "opened rotated file");

        // Replacing the slot closes the previous bucket's handle.
        self.file = Some(file);
        self.suffix = suffix;
        Ok(true)
    }

    /// Append `bytes` to the open handle.
    pub(crate) fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(bytes),
            None => Err(io::Error::other("no rotated file is open")),
        }
    }

    /// Suffix the current handle was opened for. Empty before first open.
    #[cfg(test)]
    pub(crate) fn current_suffix(&self) -> &str {
        &self.suffix
    }
}

/// `<base>.<suffix>`, appended byte-for-byte like the on-disk contract
/// requires (the base name is not treated as a directory).
fn rotated_path(base: &Path, suffix: &str) -> PathBuf {
    let mut path = base.as_os_str().to_os_string();
    path.push(".");
    path.push(suffix);
    PathBuf::from(path)
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::options().create(true).append(true).open(path)
}

#[cfg(test)]
#[path = "rotation_test.rs"]
mod rotation_test;
