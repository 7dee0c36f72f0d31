//! Stats aggregator: folds outcomes into windowed counters

use crate::{Outcome, Snapshot, Target, TargetCounts};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Counters for the currently open window.
///
/// Owned by exactly one aggregator task; handed off by value when the
/// window closes.
#[derive(Debug, Default)]
pub struct WindowCounters {
    counters: HashMap<Target, TargetCounts>,
}

impl WindowCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome in. A target seen for the first time starts at zero.
    pub fn record(&mut self, outcome: &Outcome) {
        self.counters
            .entry(outcome.target.clone())
            .or_default()
            .record(outcome.kind);
    }

    /// Seal the window into a snapshot and start a fresh, empty one
    pub fn close(&mut self, window: u64, final_flush: bool) -> Snapshot {
        Snapshot::new(window, std::mem::take(&mut self.counters), final_flush)
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

/// Single owner of the window counters.
///
/// Emits a snapshot every stats interval and resets; on cancellation it
/// stops reading outcomes, flushes the open window as a final snapshot and
/// closes the snapshot stream by dropping its sender.
pub struct Aggregator {
    outcomes: mpsc::Receiver<Outcome>,
    snapshots: mpsc::Sender<Snapshot>,
    interval: Duration,
    cancel: CancellationToken,
}

impl Aggregator {
    pub fn new(
        outcomes: mpsc::Receiver<Outcome>,
        snapshots: mpsc::Sender<Snapshot>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            outcomes,
            snapshots,
            interval,
            cancel,
        }
    }

    /// Run until cancelled. Returns the number of snapshots emitted,
    /// including the final flush.
    pub async fn run(mut self) -> u64 {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut window = WindowCounters::new();
        let mut sequence = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    sequence += 1;
                    let snapshot = window.close(sequence, false);
                    debug!(window = sequence, targets = snapshot.len(), "Window closed");
                    if self.snapshots.send(snapshot).await.is_err() {
                        warn!("Snapshot receiver dropped, stopping aggregator");
                        return sequence;
                    }
                }
                Some(outcome) = self.outcomes.recv() => window.record(&outcome),
            }
        }

        // Refuse further outcomes; fetchers still in flight see a closed channel
        self.outcomes.close();

        sequence += 1;
        let snapshot = window.close(sequence, true);
        if self.snapshots.send(snapshot).await.is_err() {
            debug!("Snapshot receiver dropped before final flush");
        }

        info!(windows = sequence, "Aggregator stopped");
        sequence
    }
}
