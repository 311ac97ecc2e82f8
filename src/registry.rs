//! Named destination registry and flush lifecycle.
//!
//! A [`LogRegistry`] hands out shared [`Destination`] handles by name,
//! creating each one on first request and reusing it for every later
//! request. It also owns the background flush task: [`LogRegistry::start`]
//! spawns it, [`LogRegistry::shutdown`] cancels it and drains every
//! buffer so no accepted line is lost.
//!
//! The registry is a cheap clone over shared state; hand copies to as
//! many tasks as need one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::clock::{Clock, SystemClock};
use crate::config::{DestinationConfig, RegistryConfig};
use crate::destination::Destination;
use crate::error::FatalError;
use crate::level::LevelFilter;
use crate::scheduler::FlushScheduler;

/// Map of destination name to its shared handle. The scheduler holds a
/// second reference to the same map.
pub(crate) type DestinationMap = Arc<Mutex<HashMap<String, Arc<Destination>>>>;

/// Running scheduler task plus the token that stops it.
struct SchedulerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

struct RegistryInner {
    destinations: DestinationMap,
    defaults: DestinationConfig,
    flush_interval: Duration,
    clock: Arc<dyn Clock>,
    fatal_tx: Option<mpsc::Sender<FatalError>>,
    scheduler: Mutex<Option<SchedulerHandle>>,
}

/// Builder for constructing a LogRegistry
pub struct LogRegistryBuilder {
    config: RegistryConfig,
    clock: Arc<dyn Clock>,
    fatal_tx: Option<mpsc::Sender<FatalError>>,
}

impl Default for LogRegistryBuilder {
    fn default() -> Self {
        Self {
            config: RegistryConfig::default(),
            clock: Arc::new(SystemClock),
            fatal_tx: None,
        }
    }
}

impl LogRegistryBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the registry configuration
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the interval between scheduled flush passes
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = interval;
        self
    }

    /// Set the configuration applied to newly created destinations
    pub fn defaults(mut self, defaults: DestinationConfig) -> Self {
        self.config.defaults = defaults;
        self
    }

    /// Set the clock used for timestamps and rotation
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Receive a [`FatalError`] whenever a destination exhausts its I/O
    /// retry. Events are sent with `try_send`; if the channel is full the
    /// event is logged and dropped rather than blocking a writer.
    pub fn fatal_notify(mut self, tx: mpsc::Sender<FatalError>) -> Self {
        self.fatal_tx = Some(tx);
        self
    }

    /// Build the registry
    pub fn build(self) -> LogRegistry {
        LogRegistry {
            inner: Arc::new(RegistryInner {
                destinations: Arc::new(Mutex::new(HashMap::new())),
                defaults: self.config.defaults,
                flush_interval: self.config.flush_interval,
                clock: self.clock,
                fatal_tx: self.fatal_tx,
                scheduler: Mutex::new(None),
            }),
        }
    }
}

/// Registry of named log destinations.
///
/// `get` is create-or-reuse: the first request for a name builds the
/// destination from the registry defaults, every later request returns
/// the same shared handle, so concurrent callers asking for one name
/// always converge on a single buffer and a single output file.
#[derive(Clone)]
pub struct LogRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for LogRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LogRegistry {
    /// Create a registry with default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for custom configuration.
    pub fn builder() -> LogRegistryBuilder {
        LogRegistryBuilder::new()
    }

    /// Get or create the destination named `name`.
    ///
    /// `name` is the base file path; rotated files are created next to it
    /// as `<name>.<suffix>`. A newly created destination starts with the
    /// registry defaults.
    pub fn get(&self, name: &str) -> Arc<Destination> {
        let mut map = self.inner.destinations.lock();
        if let Some(dest) = map.get(name) {
            return dest.clone();
        }
        let dest = Arc::new(Destination::new(
            name,
            self.inner.defaults,
            self.inner.clock.clone(),
            self.inner.fatal_tx.clone(),
        ));
        map.insert(name.to_string(), dest.clone());
        tracing::debug!(destination = name, "registered destination");
        dest
    }

    /// Get or create the destination named `name` and set its severity
    /// threshold.
    ///
    /// The threshold is applied even when the destination already exists,
    /// so the most recent caller wins.
    pub fn get_with_level(&self, name: &str, level: LevelFilter) -> Arc<Destination> {
        let dest = self.get(name);
        dest.set_level(level);
        dest
    }

    /// Spawn the background flush task if it is not already running.
    ///
    /// Must be called from within a Tokio runtime. Calling it again while
    /// the task is running has no effect.
    pub fn start(&self) {
        let mut slot = self.inner.scheduler.lock();
        if slot.is_some() {
            return;
        }
        let cancel = CancellationToken::new();
        let scheduler = FlushScheduler::new(
            self.inner.destinations.clone(),
            self.inner.flush_interval,
        );
        let task = tokio::spawn(scheduler.run(cancel.clone()));
        *slot = Some(SchedulerHandle { cancel, task });
    }

    /// Whether the background flush task is currently running.
    pub fn is_running(&self) -> bool {
        self.inner.scheduler.lock().is_some()
    }

    /// Stop the background flush task and drain every destination.
    ///
    /// Safe to call more than once; later calls just drain again. Returns
    /// the number of lines written by the final drain.
    pub async fn shutdown(&self) -> usize {
        let handle = self.inner.scheduler.lock().take();
        if let Some(handle) = handle {
            handle.cancel.cancel();
            if let Err(err) = handle.task.await {
                tracing::warn!(error = %err, "flush scheduler task failed");
            }
        }
        self.drain_all().await
    }

    /// Flush every destination once, waiting out any flush already in
    /// progress. Returns the total number of lines written.
    pub async fn drain_all(&self) -> usize {
        let targets: Vec<Arc<Destination>> =
            self.inner.destinations.lock().values().cloned().collect();

        let mut total = 0;
        for dest in targets {
            loop {
                match dest.try_flush() {
                    Some(Ok(lines)) => {
                        total += lines;
                        break;
                    }
                    Some(Err(err)) => {
                        tracing::warn!(
                            destination = dest.name(),
                            error = %err,
                            "drain flush failed"
                        );
                        break;
                    }
                    // Another flush holds the guard; let it finish.
                    None => tokio::time::sleep(Duration::from_millis(1)).await,
                }
            }
        }
        total
    }

    /// Number of registered destinations.
    pub fn len(&self) -> usize {
        self.inner.destinations.lock().len()
    }

    /// Whether no destination has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.inner.destinations.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;
