//! HTTP transport seam used by the fetcher

use crate::{AttackError, AttackResult, FetchError, Target};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use std::time::Duration;

/// Executes one GET request against a target.
///
/// Implementations return the status code for any completed round trip and
/// never interpret it; 4xx and 5xx are still `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, target: &Target, user_agent: &str) -> Result<u16, FetchError>;
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client whose overall timeout is the request timeout
    pub fn new(request_timeout: Duration) -> AttackResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AttackError::NetworkError {
                details: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, target: &Target, user_agent: &str) -> Result<u16, FetchError> {
        let request = self
            .client
            .get(target.as_str())
            .header(USER_AGENT, user_agent)
            .build()
            .map_err(|e| FetchError::Build {
                target: target.to_string(),
                reason: e.to_string(),
            })?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| FetchError::Transport {
                target: target.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        // Dropping the response releases the connection without reading the body
        drop(response);
        Ok(status)
    }
}
