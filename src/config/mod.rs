//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or SelectorConfig::default()
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SelectorConfig (validated, immutable)
//!     → owned by the selector for its whole session
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a selector is constructed
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{CacheConfig, ProbeConfig, SelectionConfig, SelectorConfig};
pub use validation::{validate_config, ValidationError};
