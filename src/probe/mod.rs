//! Health probing subsystem.
//!
//! # Data Flow
//! ```text
//! Candidate
//!     → client.rs (one GET <candidate>/health_check, bounded by the
//!       request timeout)
//!     → outcome.rs (structured ProbeOutcome: latency, status, declared
//!       version, staleness, or a failure kind)
//!     → consumed by the policy layer; never retained
//! ```
//!
//! # Design Decisions
//! - Timeout is enforced around the whole exchange, body read included
//! - A timeout is a distinct failure kind from a refused connection or a
//!   non-success status
//! - Probes are stateless; quarantine decisions live in the selection state

pub mod client;
pub mod outcome;

pub use client::HealthProber;
pub use outcome::{HealthCheckBody, ProbeFailure, ProbeOutcome};
