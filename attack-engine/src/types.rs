//! Core data types for the attack engine

use crate::{AttackError, AttackResult};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A validated target URL.
///
/// Identity is the canonical string form produced by the URL parser, so
/// `http://Example.com` and `http://example.com/` are the same target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target(Arc<str>);

impl Target {
    /// Parse and canonicalize a target URL
    pub fn parse(raw: &str) -> AttackResult<Self> {
        let url = Url::parse(raw.trim())
            .map_err(|e| AttackError::validation("target", &format!("{}: {}", raw, e)))?;
        Ok(Self(Arc::from(url.as_str())))
    }

    /// Canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The fixed, non-empty set of unique targets attacked for the whole run
#[derive(Debug, Clone)]
pub struct TargetSet {
    targets: Arc<[Target]>,
}

impl TargetSet {
    /// Build a target set from raw URL strings.
    ///
    /// Every entry must parse; duplicates (by canonical form) collapse to the
    /// first occurrence.
    pub fn new<I, S>(raw: I) -> AttackResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let targets = raw
            .into_iter()
            .map(|s| Target::parse(s.as_ref()))
            .collect::<AttackResult<Vec<_>>>()?;
        Self::from_targets(targets)
    }

    /// Build a target set from already parsed targets
    pub fn from_targets(targets: Vec<Target>) -> AttackResult<Self> {
        let mut seen = HashSet::with_capacity(targets.len());
        let unique: Vec<Target> = targets
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();

        if unique.is_empty() {
            return Err(AttackError::validation("targets", "no valid targets available"));
        }

        Ok(Self {
            targets: unique.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Always false for a constructed set
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }
}

/// Classification of one completed fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// The server answered, whatever the status code
    Succeeded,
    /// Transport-level failure: connect error, timeout, cancellation
    Failed,
}

/// One measurement of one fetch attempt, consumed once by the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub target: Target,
    pub kind: OutcomeKind,
}

impl Outcome {
    pub fn succeeded(target: Target) -> Self {
        Self {
            target,
            kind: OutcomeKind::Succeeded,
        }
    }

    pub fn failed(target: Target) -> Self {
        Self {
            target,
            kind: OutcomeKind::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Succeeded
    }

    pub fn is_failure(&self) -> bool {
        self.kind == OutcomeKind::Failed
    }
}

/// Per-target counters for one window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetCounts {
    /// Attempts that got any HTTP response
    pub requests: u64,
    /// Attempts that failed at the transport level
    pub errors: u64,
}

impl TargetCounts {
    pub fn new(requests: u64, errors: u64) -> Self {
        Self { requests, errors }
    }

    /// Fold one outcome into the counters
    pub fn record(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Succeeded => self.requests += 1,
            OutcomeKind::Failed => self.errors += 1,
        }
    }

    /// Total attempts recorded
    pub fn attempts(&self) -> u64 {
        self.requests + self.errors
    }
}

/// Immutable copy of a closed window's counters.
///
/// Targets not attempted during the window are absent.
#[derive(Debug, Clone)]
pub struct Snapshot {
    window: u64,
    closed_at: DateTime<Utc>,
    final_flush: bool,
    counters: HashMap<Target, TargetCounts>,
}

impl Snapshot {
    /// Seal a window. `window` is the 1-based window sequence number.
    pub fn new(window: u64, counters: HashMap<Target, TargetCounts>, final_flush: bool) -> Self {
        Self {
            window,
            closed_at: Utc::now(),
            final_flush,
            counters,
        }
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    pub fn closed_at(&self) -> DateTime<Utc> {
        self.closed_at
    }

    /// True for the partial window flushed on shutdown
    pub fn is_final(&self) -> bool {
        self.final_flush
    }

    pub fn get(&self, target: &Target) -> Option<TargetCounts> {
        self.counters.get(target).copied()
    }

    /// Counters for a target, zero when it was not attempted this window
    pub fn counts_for(&self, target: &Target) -> TargetCounts {
        self.get(target).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Target, &TargetCounts)> {
        self.counters.iter()
    }

    /// Entries ordered lexicographically by target
    pub fn sorted(&self) -> Vec<(&Target, &TargetCounts)> {
        let mut entries: Vec<_> = self.counters.iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        entries
    }

    /// Sum over all targets
    pub fn total(&self) -> TargetCounts {
        self.counters
            .values()
            .fold(TargetCounts::default(), |acc, c| {
                TargetCounts::new(acc.requests + c.requests, acc.errors + c.errors)
            })
    }
}
