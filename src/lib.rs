//! Fixtures - slashing-protection interchange test fixtures
//!
//! Fetches a versioned archive of interchange test vectors, extracts it into
//! a fixed directory, and runs the local fixture generator.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fsutil;
pub mod generate;
pub mod graph;
pub mod lifecycle;
pub mod ui;
pub mod version;

#[cfg(test)]
mod testing;

pub use error::{FixturesError, FixturesResult};
pub use lifecycle::LifecycleController;
pub use version::VersionTag;
