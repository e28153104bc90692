//! Health classification policy.
//!
//! # Data Flow
//! ```text
//! ProbeOutcome
//!     → classify():
//!         failure                      → Unhealthy (transport)
//!         version off the registry     → Unhealthy (incompatible)
//!         missing version/staleness    → Unhealthy (malformed)
//!         staleness within threshold   → Healthy
//!         staleness above threshold    → Backup { staleness }
//! ```
//!
//! # Design Decisions
//! - Pure decision logic, no I/O; the racer and state own side effects
//! - Backups rank by ascending staleness, earliest observation breaking ties
//! - A relaxed bar (regressed mode) accepts stale-but-compatible candidates

pub mod version;

use crate::probe::{ProbeFailure, ProbeOutcome};
use semver::Version;

/// Why a candidate was ruled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnhealthyReason {
    /// Connection error, timeout, or non-success status.
    Transport(ProbeFailure),
    /// Declared version matches no registered version line.
    IncompatibleVersion,
    /// Success status without the fields a compliant service must report.
    MalformedResponse,
}

/// What a probe outcome means for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Usable right now; stops the round.
    Healthy,
    /// Quarantined until its TTL elapses.
    Unhealthy(UnhealthyReason),
    /// Reachable and compatible but too stale; last-resort material.
    Backup { staleness: u64 },
}

impl Classification {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Classification::Healthy)
    }
}

/// Pure classification over probe outcomes for one selection session.
#[derive(Debug, Clone)]
pub struct HealthPolicy {
    known_versions: Vec<Version>,
    unhealthy_block_diff: u64,
}

impl HealthPolicy {
    pub fn new(known_versions: Vec<Version>, unhealthy_block_diff: u64) -> Self {
        Self {
            known_versions,
            unhealthy_block_diff,
        }
    }

    /// Classify one outcome. `relaxed` is the regressed-mode bar: staleness
    /// above the threshold is tolerated, everything else still applies.
    pub fn classify(&self, outcome: &ProbeOutcome, relaxed: bool) -> Classification {
        if let Some(failure) = &outcome.failure {
            return Classification::Unhealthy(UnhealthyReason::Transport(failure.clone()));
        }

        let (version, staleness) = match (&outcome.declared_version, outcome.block_difference) {
            (Some(version), Some(staleness)) => (version, staleness),
            _ => return Classification::Unhealthy(UnhealthyReason::MalformedResponse),
        };

        if !version::matches_any(version, &self.known_versions) {
            return Classification::Unhealthy(UnhealthyReason::IncompatibleVersion);
        }

        if staleness <= self.unhealthy_block_diff || relaxed {
            Classification::Healthy
        } else {
            Classification::Backup { staleness }
        }
    }
}
