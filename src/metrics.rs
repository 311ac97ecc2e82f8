//! Per-destination counters.
//!
//! Every destination carries one [`DestinationMetrics`] instance; writers
//! and the flush executor bump it with relaxed atomics so the hot path
//! never takes a lock for bookkeeping. [`DestinationMetrics::snapshot`]
//! gives a consistent-enough point-in-time copy for reporting and tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracked for a single destination.
#[derive(Debug, Default)]
pub struct DestinationMetrics {
    /// Lines accepted into the in-memory buffer.
    pub lines_buffered: AtomicU64,

    /// Lines that reached the file (flushed or written directly).
    pub lines_written: AtomicU64,

    /// Bytes that reached the file.
    pub bytes_written: AtomicU64,

    /// Completed flushes that wrote data (empty flushes are not counted).
    pub flush_count: AtomicU64,

    /// Times a new rotated file was opened.
    pub rotations: AtomicU64,

    /// Leveled writes rejected by the severity threshold.
    pub dropped_by_level: AtomicU64,

    /// Structured writes rejected by the sampling draw.
    pub dropped_by_sampling: AtomicU64,

    /// I/O attempts that failed once and were retried.
    pub write_retries: AtomicU64,

    /// I/O failures that survived the retry (fatal conditions).
    pub write_errors: AtomicU64,
}

impl DestinationMetrics {
    /// Create a zeroed metrics instance.
    pub const fn new() -> Self {
        Self {
            lines_buffered: AtomicU64::new(0),
            lines_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            flush_count: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            dropped_by_level: AtomicU64::new(0),
            dropped_by_sampling: AtomicU64::new(0),
            write_retries: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
        }
    }

    /// Record a line accepted into the buffer.
    #[inline]
    pub(crate) fn line_buffered(&self) {
        self.lines_buffered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed flush of `lines` lines totalling `bytes` bytes.
    #[inline]
    pub(crate) fn flush_completed(&self, lines: u64, bytes: u64) {
        self.flush_count.fetch_add(1, Ordering::Relaxed);
        self.lines_written.fetch_add(lines, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a synchronous (no-cache) write of `bytes` bytes.
    #[inline]
    pub(crate) fn direct_write(&self, bytes: u64) {
        self.lines_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a rotated-file open.
    #[inline]
    pub(crate) fn rotation(&self) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a leveled write rejected by the threshold.
    #[inline]
    pub(crate) fn level_drop(&self) {
        self.dropped_by_level.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a structured write rejected by the sampling draw.
    #[inline]
    pub(crate) fn sampling_drop(&self) {
        self.dropped_by_sampling.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a first-attempt I/O failure that will be retried.
    #[inline]
    pub(crate) fn write_retry(&self) {
        self.write_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an I/O failure that survived the retry.
    #[inline]
    pub(crate) fn write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lines_buffered: self.lines_buffered.load(Ordering::Relaxed),
            lines_written: self.lines_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            flush_count: self.flush_count.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            dropped_by_level: self.dropped_by_level.load(Ordering::Relaxed),
            dropped_by_sampling: self.dropped_by_sampling.load(Ordering::Relaxed),
            write_retries: self.write_retries.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.lines_buffered.store(0, Ordering::Relaxed);
        self.lines_written.store(0, Ordering::Relaxed);
        self.bytes_written.store(0, Ordering::Relaxed);
        self.flush_count.store(0, Ordering::Relaxed);
        self.rotations.store(0, Ordering::Relaxed);
        self.dropped_by_level.store(0, Ordering::Relaxed);
        self.dropped_by_sampling.store(0, Ordering::Relaxed);
        self.write_retries.store(0, Ordering::Relaxed);
        self.write_errors.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`DestinationMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub lines_buffered: u64,
    pub lines_written: u64,
    pub bytes_written: u64,
    pub flush_count: u64,
    pub rotations: u64,
    pub dropped_by_level: u64,
    pub dropped_by_sampling: u64,
    pub write_retries: u64,
    pub write_errors: u64,
}
