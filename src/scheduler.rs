//! Periodic flush fan-out.
//!
//! Runs as an async task, walking the destination map at the configured
//! interval. Each tick spawns one flush per destination that is not
//! already mid-flush and waits for the batch to finish, so cancelling
//! the token never leaves a flush in flight. The registry drains any
//! remaining buffers after the loop stops.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::destination::Destination;
use crate::registry::DestinationMap;

pub(crate) struct FlushScheduler {
    destinations: DestinationMap,
    interval: Duration,
}

impl FlushScheduler {
    pub(crate) fn new(destinations: DestinationMap, interval: Duration) -> Self {
        Self {
            destinations,
            interval,
        }
    }

    /// Tick until cancelled.
    pub(crate) async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(
            interval_ms = self.interval.as_millis() as u64,
            "flush scheduler started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("flush scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.dispatch().await;
                }
            }
        }
    }

    /// Flush every destination that is not already flushing, one task
    /// each, and wait for all of them.
    ///
    /// The map lock is held only to snapshot the handles, never across
    /// I/O. The skip is advisory; the compare-and-swap inside
    /// [`Destination::try_flush`] is what actually keeps flushes
    /// single-flight.
    async fn dispatch(&self) {
        let targets: Vec<Arc<Destination>> = self
            .destinations
            .lock()
            .values()
            .filter(|dest| !dest.is_flushing())
            .cloned()
            .collect();

        let mut flushes = JoinSet::new();
        for dest in targets {
            flushes.spawn(async move {
                // Failures are logged and escalated by the destination.
                let _ = dest.try_flush();
            });
        }

        while let Some(result) = flushes.join_next().await {
            if let Err(err) = result {
                tracing::warn!(error = %err, "flush task failed");
            }
        }
    }
}
