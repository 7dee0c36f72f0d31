//! Timing parameters for an attack run

use crate::{AttackError, AttackResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Raw attack settings as they come from flags, environment or a config file.
///
/// Units follow the command line: milliseconds for timeout and pace, seconds
/// for the stats interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackSettings {
    /// Rounds per target per wave
    pub rounds: u32,
    /// Single request timeout in milliseconds
    pub timeout_ms: u64,
    /// Stats window length in seconds
    pub stats_secs: u64,
    /// Time between waves in milliseconds
    pub pace_ms: u64,
    /// Optional cap on concurrently running fetches
    pub max_in_flight: Option<usize>,
}

impl Default for AttackSettings {
    fn default() -> Self {
        Self {
            rounds: 100,
            timeout_ms: 1000,
            stats_secs: 5,
            pace_ms: 2000,
            max_in_flight: None,
        }
    }
}

/// Validated timing parameters consumed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackConfig {
    pub request_timeout: Duration,
    pub attack_pace: Duration,
    pub stats_interval: Duration,
    pub rounds_per_wave: usize,
    /// `None` leaves fan-out unbounded
    pub max_in_flight: Option<usize>,
}

impl AttackConfig {
    /// Validate timing parameters.
    ///
    /// A zero stats interval becomes one second and zero rounds become one.
    /// The request timeout must be non-zero and strictly smaller than the pace.
    pub fn new(
        request_timeout: Duration,
        attack_pace: Duration,
        stats_interval: Duration,
        rounds_per_wave: usize,
    ) -> AttackResult<Self> {
        if request_timeout.is_zero() {
            return Err(AttackError::invalid_config("request timeout must be greater than zero"));
        }
        if attack_pace.is_zero() {
            return Err(AttackError::invalid_config("attack pace must be greater than zero"));
        }
        if request_timeout >= attack_pace {
            return Err(AttackError::invalid_config(format!(
                "timeout {}ms must be smaller than pace {}ms",
                request_timeout.as_millis(),
                attack_pace.as_millis()
            )));
        }

        let stats_interval = if stats_interval.is_zero() {
            Duration::from_secs(1)
        } else {
            stats_interval
        };
        ensure_schedulable("attack pace", attack_pace)?;
        ensure_schedulable("stats interval", stats_interval)?;

        Ok(Self {
            request_timeout,
            attack_pace,
            stats_interval,
            rounds_per_wave: rounds_per_wave.max(1),
            max_in_flight: None,
        })
    }

    /// Convert raw settings, applying the same validation as [`AttackConfig::new`]
    pub fn from_settings(settings: &AttackSettings) -> AttackResult<Self> {
        Self::new(
            Duration::from_millis(settings.timeout_ms),
            Duration::from_millis(settings.pace_ms),
            Duration::from_secs(settings.stats_secs),
            settings.rounds as usize,
        )?
        .with_max_in_flight(settings.max_in_flight)
    }

    /// Cap concurrently running fetches. `Some(0)` is rejected.
    pub fn with_max_in_flight(mut self, max_in_flight: Option<usize>) -> AttackResult<Self> {
        if max_in_flight == Some(0) {
            return Err(AttackError::validation(
                "max_in_flight",
                "must be greater than zero when set",
            ));
        }
        if let Some(cap) = max_in_flight.filter(|cap| *cap > Semaphore::MAX_PERMITS) {
            return Err(AttackError::invalid_config(format!(
                "max in-flight {} exceeds the limit of {}",
                cap,
                Semaphore::MAX_PERMITS
            )));
        }
        self.max_in_flight = max_in_flight;
        Ok(self)
    }

    /// Fetches launched per wave for `target_count` targets
    pub fn wave_size(&self, target_count: usize) -> usize {
        self.rounds_per_wave.saturating_mul(target_count)
    }

    /// Outcome channel capacity: one full wave, at least one slot
    pub fn outcome_capacity(&self, target_count: usize) -> usize {
        self.wave_size(target_count).max(1)
    }
}

/// Timers are armed at `now + period` and re-armed one period later; both
/// instants must be representable.
fn ensure_schedulable(name: &str, period: Duration) -> AttackResult<()> {
    Instant::now()
        .checked_add(period)
        .and_then(|first| first.checked_add(period))
        .map(|_| ())
        .ok_or_else(|| {
            AttackError::invalid_config(format!("{} of {}s is too large", name, period.as_secs()))
        })
}
