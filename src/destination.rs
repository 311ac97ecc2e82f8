//! A single named log output stream backed by rotating files.
//!
//! # Write path
//!
//! ```text
//! write() / debug()..fatal() / write_json()
//!     │  level gate (leveled) or sampling draw (structured)
//!     ├─ cache on:  append to buffer (mutex held for the push only)
//!     └─ cache off: file slot mutex, resolve/open rotated file, write
//!
//! flush(): CAS Idle -> Flushing, swap buffer out, open rotated file,
//!          one concatenated write, Done -> Idle
//! ```
//!
//! The three entry points filter differently: leveled writes check the
//! severity threshold and never sample; structured writes sample and
//! never check severity; plain writes do neither. Callers relying on one
//! gate must pick the matching entry point.
//!
//! Buffered lines are timestamped at call time, so output order within a
//! destination reflects call order even when several flush ticks pass
//! between append and disk.

use std::io;
use std::mem;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use chrono::SecondsFormat;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::clock::Clock;
use crate::config::{DestinationConfig, TimestampMode};
use crate::error::{Error, FatalError, Result};
use crate::filter::sample_keep;
use crate::level::{Level, LevelFilter};
use crate::metrics::DestinationMetrics;
use crate::rotation::{FileSlot, RotationPolicy};

/// Capacity of a freshly swapped-in line buffer.
pub(crate) const BUFFER_INIT_CAPACITY: usize = 64;

/// Flush executor states. `Done` is transient; it is stored and then
/// immediately replaced by `Idle` so the next tick observes an idle
/// destination.
#[repr(u8)]
enum FlushState {
    Idle = 0,
    Flushing = 1,
    Done = 2,
}

/// A named, independently configured log output stream.
///
/// Created through [`LogRegistry::get`](crate::LogRegistry::get) and
/// shared as `Arc<Destination>`; all methods take `&self`. Configuration
/// setters store into atomics and take effect on the next write or flush
/// that reads them.
pub struct Destination {
    /// Identity and base path; rotated files are `<name>.<suffix>`.
    name: String,

    level: AtomicU8,
    rotation: AtomicU8,
    timestamps: AtomicU8,
    cache_enabled: AtomicBool,
    /// f32 bit pattern, see [`Destination::keep_probability`].
    keep_probability: AtomicU32,

    /// Formatted lines awaiting flush. Locked for appends and the flush
    /// swap only, never across I/O.
    buffer: Mutex<Vec<String>>,

    flush_state: AtomicU8,

    /// Cached rotated-file handle. Held across open and write, so direct
    /// writes and flush writes serialize here.
    slot: Mutex<FileSlot>,

    clock: Arc<dyn Clock>,
    fatal_tx: Option<mpsc::Sender<FatalError>>,
    metrics: DestinationMetrics,
}

impl Destination {
    pub(crate) fn new(
        name: impl Into<String>,
        config: DestinationConfig,
        clock: Arc<dyn Clock>,
        fatal_tx: Option<mpsc::Sender<FatalError>>,
    ) -> Self {
        Self {
            name: name.into(),
            level: AtomicU8::new(config.level as u8),
            rotation: AtomicU8::new(config.rotation as u8),
            timestamps: AtomicU8::new(config.timestamps as u8),
            cache_enabled: AtomicBool::new(config.cache_enabled),
            keep_probability: AtomicU32::new(config.keep_probability.to_bits()),
            buffer: Mutex::new(Vec::with_capacity(BUFFER_INIT_CAPACITY)),
            flush_state: AtomicU8::new(FlushState::Idle as u8),
            slot: Mutex::new(FileSlot::default()),
            clock,
            fatal_tx,
            metrics: DestinationMetrics::new(),
        }
    }

    /// Destination name, also the base path of its rotated files.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-destination counters.
    #[inline]
    pub fn metrics(&self) -> &DestinationMetrics {
        &self.metrics
    }

    // =========================================================================
    // Write operations
    // =========================================================================

    /// Append a plain line. No severity check, no sampling.
    ///
    /// With timestamps enabled the line is prefixed with an RFC 3339
    /// millisecond stamp taken now, not at flush time. With caching
    /// enabled this returns without touching the disk; otherwise it
    /// blocks until the bytes are handed to the file.
    pub fn write(&self, message: &str) -> Result<()> {
        let line = self.format_line(message);
        self.enqueue(line)
    }

    /// Append a leveled line when `level` passes the severity threshold.
    ///
    /// The line becomes `<tag> <message>`, e.g. `[INFO] started`, and then
    /// follows [`Destination::write`]. Below-threshold messages return
    /// `Ok` with nothing recorded. Sampling does not apply here.
    pub fn write_leveled(&self, level: Level, message: &str) -> Result<()> {
        if !self.level().accepts(level) {
            self.metrics.level_drop();
            return Ok(());
        }

        let tag = level.tag();
        let mut tagged = String::with_capacity(tag.len() + 1 + message.len());
        tagged.push_str(tag);
        tagged.push(' ');
        tagged.push_str(message);
        self.write(&tagged)
    }

    /// [`Destination::write_leveled`] at [`Level::Debug`].
    pub fn debug(&self, message: &str) -> Result<()> {
        self.write_leveled(Level::Debug, message)
    }

    /// [`Destination::write_leveled`] at [`Level::Info`].
    pub fn info(&self, message: &str) -> Result<()> {
        self.write_leveled(Level::Info, message)
    }

    /// [`Destination::write_leveled`] at [`Level::Warn`].
    pub fn warn(&self, message: &str) -> Result<()> {
        self.write_leveled(Level::Warn, message)
    }

    /// [`Destination::write_leveled`] at [`Level::Error`].
    pub fn error(&self, message: &str) -> Result<()> {
        self.write_leveled(Level::Error, message)
    }

    /// [`Destination::write_leveled`] at [`Level::Fatal`].
    pub fn fatal(&self, message: &str) -> Result<()> {
        self.write_leveled(Level::Fatal, message)
    }

    /// Append a structured record as one JSON line.
    ///
    /// Serialization failures surface to the caller before the sampling
    /// draw, so encoder problems are never masked by a dropped write. A
    /// failed draw returns `Ok` with nothing recorded. JSON lines carry
    /// neither a timestamp prefix nor a level tag, and the severity
    /// threshold does not apply here.
    pub fn write_json<T: Serialize + ?Sized>(&self, payload: &T) -> Result<()> {
        let mut line = serde_json::to_string(payload)?;

        if !sample_keep(self.keep_probability()) {
            self.metrics.sampling_drop();
            return Ok(());
        }

        line.push('\n');
        self.enqueue(line)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Minimum severity accepted by leveled writes.
    pub fn level(&self) -> LevelFilter {
        LevelFilter::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Set the severity threshold.
    pub fn set_level(&self, filter: LevelFilter) {
        self.level.store(filter as u8, Ordering::Relaxed);
    }

    /// Current rotation policy.
    pub fn rotation(&self) -> RotationPolicy {
        RotationPolicy::from_u8(self.rotation.load(Ordering::Relaxed))
    }

    /// Set the rotation policy; the next flush or direct write resolves
    /// its file under the new policy.
    pub fn set_rotation(&self, policy: RotationPolicy) {
        self.rotation.store(policy as u8, Ordering::Relaxed);
    }

    /// Current timestamp mode for plain lines.
    pub fn timestamp_mode(&self) -> TimestampMode {
        TimestampMode::from_u8(self.timestamps.load(Ordering::Relaxed))
    }

    /// Set the timestamp mode.
    pub fn set_timestamp_mode(&self, mode: TimestampMode) {
        self.timestamps.store(mode as u8, Ordering::Relaxed);
    }

    /// Whether writes are buffered until the next flush.
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled.load(Ordering::Relaxed)
    }

    /// Toggle buffering. Disabling does not flush lines already buffered;
    /// they go out on the next flush tick.
    pub fn set_cache_enabled(&self, enabled: bool) {
        self.cache_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Keep-probability applied to structured writes.
    pub fn keep_probability(&self) -> f32 {
        f32::from_bits(self.keep_probability.load(Ordering::Relaxed))
    }

    /// Set the keep-probability; values >= 1.0 keep everything.
    pub fn set_keep_probability(&self, probability: f32) {
        self.keep_probability
            .store(probability.to_bits(), Ordering::Relaxed);
    }

    /// Whether a flush is currently in flight.
    #[inline]
    pub fn is_flushing(&self) -> bool {
        self.flush_state.load(Ordering::Acquire) == FlushState::Flushing as u8
    }

    // =========================================================================
    // Flush executor
    // =========================================================================

    /// Drain the buffer to the current rotated file.
    ///
    /// Runs one executor cycle: swap the buffer out, resolve and open the
    /// rotated file, write the lines as a single concatenated chunk.
    /// Returns the number of lines written; an empty buffer or a flush
    /// already in flight returns `Ok(0)` without touching the disk.
    ///
    /// Open and write failures are each retried once immediately; a
    /// second failure drops the swapped batch, emits a [`FatalError`] on
    /// the registry's fatal channel, and returns the error.
    pub fn flush(&self) -> Result<usize> {
        self.try_flush().unwrap_or(Ok(0))
    }

    /// Like [`Destination::flush`], but reports a lost guard race as
    /// `None` so shutdown can distinguish "busy" from "nothing to do".
    pub(crate) fn try_flush(&self) -> Option<Result<usize>> {
        if !self.begin_flush() {
            return None;
        }
        let result = self.run_flush();
        self.finish_flush();
        Some(result)
    }

    /// Guard entry: only an Idle destination may start flushing.
    fn begin_flush(&self) -> bool {
        self.flush_state
            .compare_exchange(
                FlushState::Idle as u8,
                FlushState::Flushing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    fn finish_flush(&self) {
        self.flush_state
            .store(FlushState::Done as u8, Ordering::Release);
        self.flush_state
            .store(FlushState::Idle as u8, Ordering::Release);
    }

    fn run_flush(&self) -> Result<usize> {
        let swapped = {
            let mut buffer = self.buffer.lock();
            if buffer.is_empty() {
                return Ok(0);
            }
            mem::replace(&mut *buffer, Vec::with_capacity(BUFFER_INIT_CAPACITY))
        };

        let payload = swapped.concat();

        let mut slot = self.slot.lock();
        self.open_slot(&mut slot)?;
        self.write_with_retry(&mut slot, payload.as_bytes())?;
        drop(slot);

        self.metrics
            .flush_completed(swapped.len() as u64, payload.len() as u64);
        Ok(swapped.len())
    }

    // =========================================================================
    // Shared write plumbing
    // =========================================================================

    fn format_line(&self, message: &str) -> String {
        let mut line = String::with_capacity(message.len() + 32);
        if self.timestamp_mode() == TimestampMode::Standard {
            let stamp = self
                .clock
                .now()
                .to_rfc3339_opts(SecondsFormat::Millis, true);
            line.push_str(&stamp);
            line.push(' ');
        }
        line.push_str(message);
        line.push('\n');
        line
    }

    fn enqueue(&self, line: String) -> Result<()> {
        if self.cache_enabled() {
            self.buffer.lock().push(line);
            self.metrics.line_buffered();
            return Ok(());
        }
        self.direct_write(line.as_bytes())
    }

    /// The no-cache path: open and write under the slot lock, blocking
    /// the caller for the duration of the disk write.
    fn direct_write(&self, bytes: &[u8]) -> Result<()> {
        let mut slot = self.slot.lock();
        self.open_slot(&mut slot)?;
        self.write_with_retry(&mut slot, bytes)?;
        drop(slot);

        self.metrics.direct_write(bytes.len() as u64);
        Ok(())
    }

    /// Resolve the rotated file for "now". The retry lives inside the
    /// slot; when that is also exhausted the failure is fatal.
    fn open_slot(&self, slot: &mut FileSlot) -> Result<()> {
        match slot.ensure_open(Path::new(&self.name), self.rotation(), self.clock.now()) {
            Ok(rotated) => {
                if rotated {
                    self.metrics.rotation();
                }
                Ok(())
            }
            Err(err) => Err(self.escalate(FatalError::open(&self.name, err))),
        }
    }

    fn write_with_retry(&self, slot: &mut FileSlot, bytes: &[u8]) -> Result<()> {
        if let Err(err) = slot.write_all(bytes) {
            self.metrics.write_retry();
            tracing::warn!(destination = %self.name, error = %err, "write failed, retrying");

            if let Err(err) = slot.write_all(bytes) {
                return Err(self.escalate(FatalError::write(&self.name, err)));
            }
        }
        Ok(())
    }

    /// Report a persistent I/O failure out of band and hand a matching
    /// error back to the synchronous caller.
    fn escalate(&self, fatal: FatalError) -> Error {
        self.metrics.write_error();
        tracing::error!(
            destination = %self.name,
            op = %fatal.op,
            error = %fatal.source,
            "I/O failed after retry"
        );

        // io::Error is not Clone; the fatal event keeps the original.
        let returned = io::Error::new(fatal.source.kind(), fatal.source.to_string());

        if let Some(tx) = &self.fatal_tx
            && let Err(err) = tx.try_send(fatal)
        {
            tracing::error!(destination = %self.name, error = %err, "fatal channel unavailable");
        }

        Error::Io(returned)
    }
}

#[cfg(test)]
#[path = "destination_test.rs"]
mod destination_test;
