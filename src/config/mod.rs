//! Configuration management for fixture provisioning

pub mod schema;

pub use schema::{Config, FixturesConfig, GeneratorConfig, SourceConfig};

use crate::error::{FixturesError, FixturesResult};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Configuration manager
pub struct ConfigManager {
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Use built-in defaults only
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Load overrides from a TOML file
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: Some(path),
        }
    }

    /// Load and validate the configuration
    pub async fn load(&self) -> FixturesResult<Config> {
        let config = match &self.config_path {
            Some(path) => self.load_from_file(path).await?,
            None => {
                debug!("No config file given, using built-in defaults");
                Config::default()
            }
        };

        validate(&config, self.config_path.as_deref())?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> FixturesResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| FixturesError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| FixturesError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path, if any
    pub fn path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Output directories are removed recursively, so they must be a single
/// plain name inside the working root and must not alias each other.
fn validate(config: &Config, path: Option<&Path>) -> FixturesResult<()> {
    let invalid = |reason: String| FixturesError::ConfigInvalid {
        path: path.map(Path::to_path_buf).unwrap_or_default(),
        reason,
    };

    for (key, value) in [
        ("fixtures.output_dir", &config.fixtures.output_dir),
        ("fixtures.generate_dir", &config.fixtures.generate_dir),
    ] {
        if !is_plain_name(value) {
            return Err(invalid(format!(
                "{} must be a single directory name, got {:?}",
                key, value
            )));
        }
    }

    if config.fixtures.output_dir == config.fixtures.generate_dir {
        return Err(invalid(
            "fixtures.output_dir and fixtures.generate_dir must differ".to_string(),
        ));
    }

    if config.generator.program.trim().is_empty() {
        return Err(invalid("generator.program must not be empty".to_string()));
    }

    Ok(())
}

fn is_plain_name(value: &str) -> bool {
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
