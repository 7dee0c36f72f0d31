//! Property-based tests for the attack engine core

use crate::*;
use async_trait::async_trait;
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const HOSTS: [&str; 5] = ["alpha", "bravo", "charlie", "delta", "echo"];

fn target(index: usize) -> Target {
    Target::parse(&format!("http://{}.test", HOSTS[index])).unwrap()
}

fn outcome(index: usize, succeeded: bool) -> Outcome {
    if succeeded {
        Outcome::succeeded(target(index))
    } else {
        Outcome::failed(target(index))
    }
}

prop_compose! {
    fn arb_outcomes()
        (events in prop::collection::vec((0usize..HOSTS.len(), any::<bool>()), 0..200))
    -> Vec<Outcome> {
        events.into_iter().map(|(i, ok)| outcome(i, ok)).collect()
    }
}

#[derive(Default)]
struct CountingTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl HttpTransport for CountingTransport {
    async fn get(&self, _target: &Target, _user_agent: &str) -> Result<u16, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(204)
    }
}

proptest! {
    /// For every window and target, requests + errors equals the number of
    /// outcome events attributed to that target.
    #[test]
    fn property_window_conservation(outcomes in arb_outcomes()) {
        let mut window = WindowCounters::new();
        for o in &outcomes {
            window.record(o);
        }
        let snapshot = window.close(1, false);

        let mut expected: HashMap<Target, TargetCounts> = HashMap::new();
        for o in &outcomes {
            expected.entry(o.target.clone()).or_default().record(o.kind);
        }

        prop_assert_eq!(snapshot.len(), expected.len());
        for (target, counts) in &expected {
            prop_assert_eq!(snapshot.counts_for(target), *counts);
        }
        prop_assert_eq!(snapshot.total().attempts(), outcomes.len() as u64);
    }

    /// Counts never leak from one window into the next.
    #[test]
    fn property_windows_reset(outcomes in arb_outcomes(), split in 0usize..200) {
        let split = split.min(outcomes.len());
        let (first, second) = outcomes.split_at(split);

        let mut window = WindowCounters::new();
        for o in first {
            window.record(o);
        }
        let _ = window.close(1, false);
        for o in second {
            window.record(o);
        }
        let snapshot = window.close(2, false);

        prop_assert_eq!(snapshot.total().attempts(), second.len() as u64);
        for index in 0..HOSTS.len() {
            let t = target(index);
            let attempts = second.iter().filter(|o| o.target == t).count() as u64;
            prop_assert_eq!(snapshot.counts_for(&t).attempts(), attempts);
        }
    }

    /// Rendered lines come out ordered by target, one per attempted target.
    #[test]
    fn property_render_is_sorted(outcomes in arb_outcomes()) {
        let mut window = WindowCounters::new();
        for o in &outcomes {
            window.record(o);
        }
        let snapshot = window.close(1, false);
        let block = render_snapshot(&snapshot);
        let lines: Vec<&str> = block.lines().collect();

        prop_assert_eq!(lines.len(), snapshot.len());
        let mut sorted = lines.clone();
        sorted.sort();
        prop_assert_eq!(lines, sorted);
    }

    /// A wave launches exactly targets × rounds fetches.
    #[test]
    fn property_wave_launches_targets_times_rounds(target_count in 1usize..=5, rounds in 1usize..8) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (launched, calls, received) = runtime.block_on(async {
            let transport = Arc::new(CountingTransport::default());
            let cancel = CancellationToken::new();
            let config = AttackConfig::new(
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_secs(1),
                rounds,
            )
            .unwrap();
            let targets = TargetSet::from_targets((0..target_count).map(target).collect()).unwrap();
            let (tx, mut rx) = mpsc::channel(config.outcome_capacity(targets.len()));
            let fetcher = Fetcher::new(transport.clone(), config.request_timeout, tx, cancel.clone());
            let scheduler = Scheduler::new(targets, &config, fetcher, cancel);

            let launched = scheduler.launch_wave();
            let mut received = 0;
            for _ in 0..launched {
                if rx.recv().await.is_some() {
                    received += 1;
                }
            }
            (launched, transport.calls.load(Ordering::SeqCst), received)
        });

        prop_assert_eq!(launched, target_count * rounds);
        prop_assert_eq!(calls, target_count * rounds);
        prop_assert_eq!(received, target_count * rounds);
    }
}
