//! Error types for fixture provisioning
//!
//! All modules use `FixturesResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fixture operations
pub type FixturesResult<T> = Result<T, FixturesError>;

/// All errors that can occur while provisioning fixtures
#[derive(Error, Debug)]
pub enum FixturesError {
    // Fetch errors
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    // Archive errors
    #[error("Malformed archive {path}: {reason}")]
    ArchiveFormat { path: PathBuf, reason: String },

    // Generator errors
    #[error("Fixture generator failed: {command}, exit code: {code}")]
    GeneratorFailed { command: String, code: i32 },

    #[error("Fixture generator terminated by signal: {command}")]
    GeneratorSignaled { command: String },

    #[error("Failed to launch fixture generator: {command}")]
    GeneratorLaunch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid version tag {tag:?}: {reason}")]
    InvalidVersionTag { tag: String, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Pipeline stage an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Fetch,
    Extract,
    Generate,
    Io,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Config => "config",
            Self::Fetch => "fetch",
            Self::Extract => "extract",
            Self::Generate => "generate",
            Self::Io => "io",
        };
        write!(f, "{}", name)
    }
}

impl FixturesError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a fetch error
    pub fn fetch(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an archive format error
    pub fn archive_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArchiveFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// The pipeline stage that produced this error
    pub fn stage(&self) -> Stage {
        match self {
            Self::Fetch { .. } => Stage::Fetch,
            Self::ArchiveFormat { .. } => Stage::Extract,
            Self::GeneratorFailed { .. }
            | Self::GeneratorSignaled { .. }
            | Self::GeneratorLaunch { .. } => Stage::Generate,
            Self::ConfigInvalid { .. } | Self::InvalidVersionTag { .. } => Stage::Config,
            Self::Io { .. } | Self::Internal(_) => Stage::Io,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Fetch { .. } => Some("Check network access and that the version tag exists upstream"),
            Self::ArchiveFormat { .. } => {
                Some("Run: fixtures clean-archives, then fixtures acquire-fixtures")
            }
            Self::GeneratorLaunch { .. } => Some("Check generator.program in the configuration"),
            _ => None,
        }
    }
}
