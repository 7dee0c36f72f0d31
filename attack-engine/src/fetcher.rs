//! Single timed fetch and outcome classification

use crate::user_agent::{pick_user_agent, BROWSER_USER_AGENTS};
use crate::{FetchError, HttpTransport, Outcome, OutcomeKind, Target};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Executes one GET per call and reports the outcome on the outcome channel.
///
/// Cheap to clone; every spawned fetch task owns a clone.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    request_timeout: Duration,
    outcomes: mpsc::Sender<Outcome>,
    cancel: CancellationToken,
    user_agents: &'static [&'static str],
}

impl Fetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        request_timeout: Duration,
        outcomes: mpsc::Sender<Outcome>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            request_timeout,
            outcomes,
            cancel,
            user_agents: BROWSER_USER_AGENTS,
        }
    }

    /// Replace the User-Agent pool
    pub fn with_user_agents(mut self, user_agents: &'static [&'static str]) -> Self {
        self.user_agents = user_agents;
        self
    }

    /// Fetch `target` once.
    ///
    /// Returns the classification that was emitted, or `None` when the
    /// request could not be built and nothing was emitted.
    pub async fn fetch(&self, target: Target) -> Option<OutcomeKind> {
        let user_agent = pick_user_agent(self.user_agents, &mut rand::thread_rng()).unwrap_or("");

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(FetchError::Cancelled {
                target: target.to_string(),
            }),
            res = tokio::time::timeout(self.request_timeout, self.transport.get(&target, user_agent)) => {
                match res {
                    Ok(inner) => inner,
                    Err(_) => Err(FetchError::TimedOut {
                        target: target.to_string(),
                        duration_ms: self.request_timeout.as_millis() as u64,
                    }),
                }
            }
        };

        let kind = match result {
            Ok(status) => {
                debug!(url = %target, status, "Request completed");
                OutcomeKind::Succeeded
            }
            Err(e) if !e.is_transport_failure() => {
                warn!(url = %target, error = %e, "Dropping request that could not be built");
                return None;
            }
            Err(e) => {
                debug!(url = %target, error = %e, "Request failed");
                OutcomeKind::Failed
            }
        };

        if self.outcomes.send(Outcome { target, kind }).await.is_err() {
            // Aggregator already shut down; abandoned fetches just discard
            debug!("Outcome channel closed, discarding outcome");
        }
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedTransport(Result<u16, FetchError>);

    #[async_trait]
    impl HttpTransport for FixedTransport {
        async fn get(&self, _target: &Target, _user_agent: &str) -> Result<u16, FetchError> {
            self.0.clone()
        }
    }

    struct HangingTransport;

    #[async_trait]
    impl HttpTransport for HangingTransport {
        async fn get(&self, _target: &Target, _user_agent: &str) -> Result<u16, FetchError> {
            std::future::pending().await
        }
    }

    fn target() -> Target {
        Target::parse("http://service.test/health").unwrap()
    }

    fn fetcher(
        transport: impl HttpTransport + 'static,
    ) -> (Fetcher, mpsc::Receiver<Outcome>, CancellationToken) {
        let (tx, rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let fetcher = Fetcher::new(
            Arc::new(transport),
            Duration::from_millis(500),
            tx,
            cancel.clone(),
        );
        (fetcher, rx, cancel)
    }

    #[tokio::test]
    async fn test_server_error_status_is_success() {
        let (fetcher, mut rx, _cancel) = fetcher(FixedTransport(Ok(500)));

        assert_eq!(fetcher.fetch(target()).await, Some(OutcomeKind::Succeeded));
        assert_eq!(rx.recv().await, Some(Outcome::succeeded(target())));
    }

    #[tokio::test]
    async fn test_transport_failure_is_error() {
        let (fetcher, mut rx, _cancel) = fetcher(FixedTransport(Err(FetchError::Transport {
            target: target().to_string(),
            reason: "connection refused".into(),
        })));

        assert_eq!(fetcher.fetch(target()).await, Some(OutcomeKind::Failed));
        assert_eq!(rx.recv().await, Some(Outcome::failed(target())));
    }

    #[tokio::test]
    async fn test_build_failure_emits_nothing() {
        let (fetcher, mut rx, _cancel) = fetcher(FixedTransport(Err(FetchError::Build {
            target: target().to_string(),
            reason: "bad url".into(),
        })));

        assert_eq!(fetcher.fetch(target()).await, None);
        drop(fetcher);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_request_times_out() {
        let (fetcher, mut rx, _cancel) = fetcher(HangingTransport);

        assert_eq!(fetcher.fetch(target()).await, Some(OutcomeKind::Failed));
        assert_eq!(rx.recv().await, Some(Outcome::failed(target())));
    }

    #[tokio::test]
    async fn test_cancellation_mid_flight_is_error() {
        let (fetcher, mut rx, cancel) = fetcher(HangingTransport);

        let task = tokio::spawn(async move { fetcher.fetch(target()).await });
        tokio::task::yield_now().await;
        cancel.cancel();

        assert_eq!(task.await.unwrap(), Some(OutcomeKind::Failed));
        assert_eq!(rx.recv().await, Some(Outcome::failed(target())));
    }

    #[tokio::test]
    async fn test_closed_outcome_channel_is_ignored() {
        let (fetcher, rx, _cancel) = fetcher(FixedTransport(Ok(200)));
        drop(rx);

        assert_eq!(fetcher.fetch(target()).await, Some(OutcomeKind::Succeeded));
    }
}
