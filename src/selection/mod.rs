//! Selection subsystem.
//!
//! # Data Flow
//! ```text
//! selector.rs (orchestrator)
//!     → state.rs (quarantine sets, counters, regressed mode,
//!       round-level decay sweeps)
//!     → cache.rs (cached selection, freshness monitor)
//! ```
//!
//! # Design Decisions
//! - State is constructor-scoped and owned by one selector, never a
//!   module-level singleton; independent sessions cannot interfere
//! - The cache is an abstract collaborator so durable stores plug in

pub mod cache;
pub mod selector;
pub mod state;

pub use cache::{cache_key, CachedSelection, FreshnessMonitor, MemoryCache, SelectionCache};
pub use selector::ServiceSelector;
pub use state::SelectionState;
