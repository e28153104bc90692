//! Health probe client.
//!
//! # Responsibilities
//! - Issue exactly one bounded-time health check per call
//! - Classify the result into a structured outcome

use crate::config::ProbeConfig;
use crate::observability::metrics;
use crate::probe::outcome::{HealthCheckBody, ProbeFailure, ProbeOutcome};
use crate::source::Candidate;
use std::time::{Duration, Instant};
use tokio::time;

/// Issues health checks against candidates.
///
/// Cheap to clone: the underlying HTTP client is shared.
#[derive(Debug, Clone)]
pub struct HealthProber {
    client: reqwest::Client,
    path: String,
    timeout: Duration,
}

impl HealthProber {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            path: config.health_check_path.clone(),
            timeout: config.request_timeout(),
        }
    }

    /// Probe one candidate. Never takes longer than the configured timeout,
    /// body read included; a timeout is reported as its own failure kind.
    pub async fn probe(&self, candidate: &Candidate) -> ProbeOutcome {
        let url = candidate.health_check_url(&self.path);
        let start = Instant::now();

        let exchange = async {
            let response = self
                .client
                .get(url)
                .header("user-agent", "service-selector-health-check")
                .send()
                .await?;
            let status = response.status();
            let body = if status.is_success() {
                response.json::<HealthCheckBody>().await.ok()
            } else {
                None
            };
            Ok::<_, reqwest::Error>((status.as_u16(), status.is_success(), body))
        };

        let outcome = match time::timeout(self.timeout, exchange).await {
            Ok(Ok((status, true, body))) => {
                ProbeOutcome::success(candidate.clone(), start.elapsed(), status, body)
            }
            Ok(Ok((status, false, _))) => {
                tracing::warn!(
                    candidate = %candidate,
                    status,
                    "health check failed: non-success status"
                );
                ProbeOutcome::failure(
                    candidate.clone(),
                    start.elapsed(),
                    ProbeFailure::Status(status),
                )
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    candidate = %candidate,
                    error = %e,
                    "health check failed: connection error"
                );
                ProbeOutcome::failure(
                    candidate.clone(),
                    start.elapsed(),
                    ProbeFailure::Transport(e.to_string()),
                )
            }
            Err(_) => {
                tracing::warn!(candidate = %candidate, "health check failed: timeout");
                ProbeOutcome::failure(candidate.clone(), self.timeout, ProbeFailure::Timeout)
            }
        };

        metrics::record_probe(candidate.as_str(), outcome.is_ok());
        outcome
    }
}
