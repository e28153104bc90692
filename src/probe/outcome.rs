//! Probe outcome types.

use crate::source::Candidate;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body a compliant service returns from its health check endpoint.
///
/// Fields are optional so a 200 with a partial body still produces an
/// outcome; the policy layer decides what a missing field means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckBody {
    pub service: Option<String>,
    pub version: Option<String>,
    pub block_difference: Option<u64>,
}

/// Why a probe did not come back with a usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// No response within the probe deadline.
    Timeout,
    /// Connection-level failure (refused, DNS, reset).
    Transport(String),
    /// Response arrived with a non-success status.
    Status(u16),
}

/// Outcome of a single health probe against one candidate.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub candidate: Candidate,
    pub latency: Duration,
    /// Raw HTTP status, when a response arrived at all.
    pub status: Option<u16>,
    pub failure: Option<ProbeFailure>,
    pub declared_version: Option<Version>,
    pub block_difference: Option<u64>,
}

impl ProbeOutcome {
    /// Outcome for a 2xx response; an unparseable version string is
    /// dropped rather than failing the probe.
    pub fn success(
        candidate: Candidate,
        latency: Duration,
        status: u16,
        body: Option<HealthCheckBody>,
    ) -> Self {
        let body = body.unwrap_or_default();
        Self {
            candidate,
            latency,
            status: Some(status),
            failure: None,
            declared_version: body
                .version
                .as_deref()
                .and_then(|v| Version::parse(v).ok()),
            block_difference: body.block_difference,
        }
    }

    /// Outcome for a failed probe.
    pub fn failure(candidate: Candidate, latency: Duration, failure: ProbeFailure) -> Self {
        let status = match &failure {
            ProbeFailure::Status(code) => Some(*code),
            _ => None,
        };
        Self {
            candidate,
            latency,
            status,
            failure: Some(failure),
            declared_version: None,
            block_difference: None,
        }
    }

    /// True when the service answered with a success status.
    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Candidate {
        Candidate::parse("https://node.example.com").unwrap()
    }

    #[test]
    fn test_success_parses_version() {
        let outcome = ProbeOutcome::success(
            candidate(),
            Duration::from_millis(12),
            200,
            Some(HealthCheckBody {
                service: Some("discovery-provider".to_string()),
                version: Some("1.2.3".to_string()),
                block_difference: Some(0),
            }),
        );
        assert!(outcome.is_ok());
        assert_eq!(outcome.declared_version, Version::parse("1.2.3").ok());
        assert_eq!(outcome.block_difference, Some(0));
    }

    #[test]
    fn test_garbled_version_is_dropped_not_fatal() {
        let outcome = ProbeOutcome::success(
            candidate(),
            Duration::from_millis(5),
            200,
            Some(HealthCheckBody {
                service: None,
                version: Some("not-semver".to_string()),
                block_difference: Some(3),
            }),
        );
        assert!(outcome.is_ok());
        assert!(outcome.declared_version.is_none());
    }

    #[test]
    fn test_status_failure_keeps_raw_status() {
        let outcome = ProbeOutcome::failure(
            candidate(),
            Duration::from_millis(8),
            ProbeFailure::Status(400),
        );
        assert!(!outcome.is_ok());
        assert_eq!(outcome.status, Some(400));
    }
}
