//! Attack engine: wires scheduler, fetchers, aggregator and reporter together

use crate::{
    Aggregator, AttackConfig, AttackResult, Fetcher, HttpTransport, ReportSink, Reporter,
    ReqwestTransport, Scheduler, Snapshot, TargetSet,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Snapshots are handed over one at a time
const SNAPSHOT_CHANNEL_CAPACITY: usize = 1;

/// Core attack execution engine
pub struct AttackEngine {
    run_id: Uuid,
    targets: TargetSet,
    config: AttackConfig,
    transport: Arc<dyn HttpTransport>,
    user_agents: Option<&'static [&'static str]>,
}

/// A started attack whose snapshots are consumed by the caller
pub struct RunningAttack {
    /// Closed after the final flush on cancellation
    pub snapshots: mpsc::Receiver<Snapshot>,
    pub tasks: AttackTasks,
}

/// Background tasks of a started attack
pub struct AttackTasks {
    run_id: Uuid,
    scheduler: JoinHandle<u64>,
    aggregator: JoinHandle<u64>,
}

impl AttackTasks {
    /// Wait for the scheduler and aggregator to stop after cancellation.
    ///
    /// Snapshots must still be drained by the caller, otherwise the final
    /// flush can block the aggregator.
    pub async fn join(self) -> AttackResult<AttackSummary> {
        let waves = self.scheduler.await?;
        let windows = self.aggregator.await?;
        Ok(AttackSummary {
            run_id: self.run_id,
            waves,
            windows,
        })
    }
}

/// What an attack run did, reported once it stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackSummary {
    pub run_id: Uuid,
    pub waves: u64,
    /// Snapshots emitted, the final flush included
    pub windows: u64,
}

impl AttackEngine {
    /// Create a new attack engine over an arbitrary transport
    pub fn new(targets: TargetSet, config: AttackConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            targets,
            config,
            transport,
            user_agents: None,
        }
    }

    /// Create an engine backed by `reqwest` with the configured request timeout
    pub fn with_reqwest(targets: TargetSet, config: AttackConfig) -> AttackResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::new(targets, config, Arc::new(transport)))
    }

    /// Replace the User-Agent pool
    pub fn with_user_agents(mut self, user_agents: &'static [&'static str]) -> Self {
        self.user_agents = Some(user_agents);
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Spawn the scheduler and aggregator; the caller consumes snapshots
    pub fn start(self, cancel: CancellationToken) -> RunningAttack {
        let span = info_span!("attack", run_id = %self.run_id);
        let capacity = self.config.outcome_capacity(self.targets.len());
        let (outcome_tx, outcome_rx) = mpsc::channel(capacity);
        let (snapshot_tx, snapshot_rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);

        span.in_scope(|| {
            info!(
                targets = self.targets.len(),
                wave_size = self.config.wave_size(self.targets.len()),
                timeout_ms = self.config.request_timeout.as_millis() as u64,
                pace_ms = self.config.attack_pace.as_millis() as u64,
                stats_ms = self.config.stats_interval.as_millis() as u64,
                max_in_flight = ?self.config.max_in_flight,
                "Starting attack"
            );
        });

        let mut fetcher = Fetcher::new(
            self.transport,
            self.config.request_timeout,
            outcome_tx,
            cancel.clone(),
        );
        if let Some(user_agents) = self.user_agents {
            fetcher = fetcher.with_user_agents(user_agents);
        }

        let aggregator = Aggregator::new(
            outcome_rx,
            snapshot_tx,
            self.config.stats_interval,
            cancel.clone(),
        );
        let scheduler = Scheduler::new(self.targets, &self.config, fetcher, cancel);

        RunningAttack {
            snapshots: snapshot_rx,
            tasks: AttackTasks {
                run_id: self.run_id,
                aggregator: tokio::spawn(aggregator.run().instrument(span.clone())),
                scheduler: tokio::spawn(scheduler.run().instrument(span)),
            },
        }
    }

    /// Run until `cancel` fires, rendering every snapshot on `sink`
    pub async fn run<S>(self, sink: S, cancel: CancellationToken) -> AttackResult<AttackSummary>
    where
        S: ReportSink + 'static,
    {
        let span = info_span!("report", run_id = %self.run_id);
        let RunningAttack { snapshots, tasks } = self.start(cancel.clone());

        let reporter = Reporter::new(snapshots, sink, cancel);
        let reporter = tokio::spawn(reporter.run().instrument(span));

        let summary = tasks.join().await?;
        reporter.await?;

        info!(run_id = %summary.run_id, waves = summary.waves, windows = summary.windows, "Attack finished");
        Ok(summary)
    }
}
