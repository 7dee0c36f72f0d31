//! Attack Engine - paced HTTP load generation core
//!
//! Fires waves of concurrent GET requests at a fixed cadence, classifies each
//! attempt as a success (any HTTP response) or a transport error, folds the
//! outcomes into per-target counters over rolling windows and hands immutable
//! snapshots of every window to a reporter.
//!
//! Data flow:
//!
//! ```text
//! Scheduler --spawns--> Fetcher(s) --Outcome--> Aggregator --Snapshot--> Reporter
//! ```
//!
//! One `CancellationToken` stops all of them. The aggregator is the only
//! writer of the window counters; everything else talks to it through the
//! outcome and snapshot channels.

pub mod types;
pub mod config;
pub mod error;
pub mod user_agent;
pub mod transport;
pub mod fetcher;
pub mod scheduler;
pub mod aggregator;
pub mod reporter;
pub mod execution;

#[cfg(test)]
mod tests;

pub use types::{Outcome, OutcomeKind, Snapshot, Target, TargetCounts, TargetSet};

pub use config::{AttackConfig, AttackSettings};

pub use error::{AttackError, AttackResult, FetchError};

pub use user_agent::{pick_user_agent, BROWSER_USER_AGENTS};

pub use transport::{HttpTransport, ReqwestTransport};

pub use fetcher::Fetcher;

pub use scheduler::Scheduler;

pub use aggregator::{Aggregator, WindowCounters};

pub use reporter::{render_snapshot, PlainSink, ReportSink, Reporter, TerminalSink};

pub use execution::{AttackEngine, AttackSummary, AttackTasks, RunningAttack};
