//! Configuration schema for fixture provisioning
//!
//! Every field has a default matching the pinned fixture layout, so an empty
//! file (or no file at all) yields the canonical configuration.

use crate::version::VersionTag;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fixture layout and pinned version
    pub fixtures: FixturesConfig,

    /// Remote archive source
    pub source: SourceConfig,

    /// External fixture generator
    pub generator: GeneratorConfig,
}

/// Fixture layout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixturesConfig {
    /// Archive revision to provision
    pub version_tag: VersionTag,

    /// Directory name for the extracted interchange tests
    pub output_dir: String,

    /// Directory name for generated tests
    pub generate_dir: String,

    /// Where downloaded archives are kept (defaults to the working root)
    pub cache_dir: Option<PathBuf>,
}

impl Default for FixturesConfig {
    fn default() -> Self {
        Self {
            version_tag: VersionTag::default(),
            output_dir: "interchange-tests".to_string(),
            generate_dir: "generated-tests".to_string(),
            cache_dir: None,
        }
    }
}

/// Remote archive source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL; the version tag is appended as the last path segment
    pub base_url: String,

    /// Overall request timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://github.com/eth-clients/slashing-protection-interchange-tests/tarball"
                .to_string(),
            timeout_secs: 300,
        }
    }
}

impl SourceConfig {
    /// URL of the archive for `tag`
    pub fn archive_url(&self, tag: &VersionTag) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), tag)
    }
}

/// External fixture generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program to execute
    pub program: String,

    /// Arguments placed before the output directory
    pub args: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            args: vec![
                "run".to_string(),
                "--release".to_string(),
                "--bin".to_string(),
                "test_generator".to_string(),
                "--".to_string(),
            ],
        }
    }
}
