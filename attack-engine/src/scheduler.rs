//! Wave scheduler: paces and fans out fetches

use crate::{AttackConfig, Fetcher, TargetSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Fires one wave of `rounds × targets` fetches every pace tick.
///
/// Waves never wait for each other. In-flight fetches are not joined on
/// shutdown; they end through their own deadline or the cancellation token.
pub struct Scheduler {
    targets: TargetSet,
    rounds: usize,
    pace: Duration,
    fetcher: Fetcher,
    limiter: Option<Arc<Semaphore>>,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(
        targets: TargetSet,
        config: &AttackConfig,
        fetcher: Fetcher,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            targets,
            rounds: config.rounds_per_wave,
            pace: config.attack_pace,
            fetcher,
            limiter: config.max_in_flight.map(|n| Arc::new(Semaphore::new(n))),
            cancel,
        }
    }

    /// Spawn one wave and return how many fetches were launched
    pub fn launch_wave(&self) -> usize {
        let mut launched = 0;
        for _round in 0..self.rounds {
            for target in self.targets.iter() {
                let fetcher = self.fetcher.clone();
                let target = target.clone();
                let limiter = self.limiter.clone();
                let cancel = self.cancel.clone();

                tokio::spawn(async move {
                    let _permit = match limiter {
                        Some(limiter) => tokio::select! {
                            _ = cancel.cancelled() => return,
                            permit = limiter.acquire_owned() => match permit {
                                Ok(permit) => Some(permit),
                                Err(_) => return,
                            },
                        },
                        None => None,
                    };
                    fetcher.fetch(target).await;
                });
                launched += 1;
            }
        }
        launched
    }

    /// Run until cancelled. Returns the number of waves launched.
    pub async fn run(self) -> u64 {
        // First wave fires one full pace after start
        let mut ticker = interval_at(Instant::now() + self.pace, self.pace);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut waves = 0u64;

        info!(
            targets = self.targets.len(),
            rounds = self.rounds,
            pace_ms = self.pace.as_millis() as u64,
            "Scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let launched = self.launch_wave();
                    waves += 1;
                    debug!(wave = waves, launched, "Launched wave");
                }
            }
        }

        info!(waves, "Scheduler stopped");
        waves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FetchError, HttpTransport, Target};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HttpTransport for CountingTransport {
        async fn get(&self, _target: &Target, _user_agent: &str) -> Result<u16, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(200)
        }
    }

    /// Tracks the high-water mark of concurrently running requests
    #[derive(Default)]
    struct GaugeTransport {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl HttpTransport for GaugeTransport {
        async fn get(&self, _target: &Target, _user_agent: &str) -> Result<u16, FetchError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(200)
        }
    }

    fn config(rounds: usize) -> AttackConfig {
        AttackConfig::new(
            Duration::from_millis(100),
            Duration::from_millis(1000),
            Duration::from_secs(5),
            rounds,
        )
        .unwrap()
    }

    fn targets() -> TargetSet {
        TargetSet::new(["http://a.test", "http://b.test", "http://c.test"]).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_tick_launches_one_full_wave() {
        let transport = Arc::new(CountingTransport::default());
        let cancel = CancellationToken::new();
        let (tx, _rx) = mpsc::channel(1024);
        let fetcher = Fetcher::new(transport.clone(), Duration::from_millis(100), tx, cancel.clone());
        let scheduler = Scheduler::new(targets(), &config(4), fetcher, cancel.clone());

        let handle = tokio::spawn(scheduler.run());

        // Waves fire at 1s, 2s and 3s
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3 * 3 * 4);

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wave_before_first_pace() {
        let transport = Arc::new(CountingTransport::default());
        let cancel = CancellationToken::new();
        let (tx, _rx) = mpsc::channel(64);
        let fetcher = Fetcher::new(transport.clone(), Duration::from_millis(100), tx, cancel.clone());
        let scheduler = Scheduler::new(targets(), &config(1), fetcher, cancel.clone());

        let handle = tokio::spawn(scheduler.run());
        tokio::time::sleep(Duration::from_millis(900)).await;
        cancel.cancel();

        assert_eq!(handle.await.unwrap(), 0);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_cap_bounds_concurrency() {
        let transport = Arc::new(GaugeTransport::default());
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(64);
        let fetcher = Fetcher::new(transport.clone(), Duration::from_millis(500), tx, cancel.clone());
        let config = config(4).with_max_in_flight(Some(2)).unwrap();
        let scheduler = Scheduler::new(targets(), &config, fetcher, cancel.clone());

        assert_eq!(scheduler.launch_wave(), 12);
        for _ in 0..12 {
            assert!(rx.recv().await.unwrap().is_success());
        }
        assert_eq!(transport.peak.load(Ordering::SeqCst), 2);
    }
}
