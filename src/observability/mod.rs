//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via the tracing crate; subscriber setup is the
//!   host application's call, offered here as a convenience
//! - Metrics go through the metrics facade; exposition (Prometheus or
//!   otherwise) is wired up by the host, not this library

pub mod logging;
pub mod metrics;
