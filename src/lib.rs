//! Adaptive service selection library.
//!
//! Picks a healthy backend node out of a dynamic, untrusted pool of
//! candidate endpoints by racing concurrent health checks, applying
//! version-compatibility and staleness rules, and quarantining bad nodes
//! for a bounded time.
//!
//! # Architecture Overview
//!
//! ```text
//! select()
//!     ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//!     │ selection::  │───▶│    race      │───▶│    probe     │──▶ GET
//!     │   selector   │    │ (round fan-  │    │ (one bounded │    /health_check
//!     │ (orchestrate)│◀───│  out, latch) │◀───│   request)   │
//!     └──────┬───────┘    └──────────────┘    └──────────────┘
//!            │
//!            ▼
//!     ┌──────────────┐    ┌──────────────┐
//!     │   policy     │    │ selection::  │
//!     │ (classify:   │───▶│    state     │
//!     │  healthy /   │    │ (quarantine, │
//!     │  unhealthy / │    │  backups,    │
//!     │  backup)     │    │  regressed)  │
//!     └──────────────┘    └──────────────┘
//!
//! Cross-cutting: config (validated at construction), selection::cache
//! (reselect short-path + freshness monitor), observability, lifecycle.
//! ```
//!
//! # Use
//!
//! ```no_run
//! use std::sync::Arc;
//! use semver::Version;
//! use service_selector::config::SelectorConfig;
//! use service_selector::selection::{MemoryCache, ServiceSelector};
//! use service_selector::source::{Candidate, StaticCandidateSource};
//!
//! # async fn run() -> Result<(), service_selector::SelectorError> {
//! let source = StaticCandidateSource::new(
//!     vec![Candidate::parse("https://node.example.com").unwrap()],
//!     Version::new(1, 2, 3),
//! );
//! let selector = ServiceSelector::new(SelectorConfig::default(), Arc::new(source))?
//!     .with_cache(Arc::new(MemoryCache::new()));
//!
//! let endpoint = selector.select().await?;
//! # Ok(())
//! # }
//! ```

// Core subsystems
pub mod config;
pub mod policy;
pub mod probe;
pub mod race;
pub mod selection;
pub mod source;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::SelectorConfig;
pub use error::{SelectorError, SelectorResult};
pub use lifecycle::Shutdown;
pub use selection::{MemoryCache, SelectionCache, ServiceSelector};
pub use source::{Candidate, CandidateSource, StaticCandidateSource};
