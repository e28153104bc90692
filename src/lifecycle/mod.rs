//! Lifecycle coordination for background tasks.

pub mod shutdown;

pub use shutdown::Shutdown;
