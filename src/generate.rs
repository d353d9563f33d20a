//! Fixture generation
//!
//! The generator itself is an external program; this module only decides
//! where it writes, clears that directory first, and turns its exit status
//! into a result.

use crate::config::GeneratorConfig;
use crate::error::{FixturesError, FixturesResult};
use crate::fsutil;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Something that can populate a directory with fixtures
#[async_trait]
pub trait FixtureGenerator: Send + Sync {
    /// Write fixtures into `output_dir`, which does not exist on entry
    async fn generate(&self, output_dir: &Path) -> FixturesResult<()>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// Runs an external program with the output directory as its last argument
pub struct ProcessGenerator {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl ProcessGenerator {
    /// Create a generator running in `working_dir`
    pub fn new(config: &GeneratorConfig, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            working_dir: working_dir.into(),
        }
    }

    fn command_line(&self, output_dir: &Path) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.push(output_dir.display().to_string());
        parts.join(" ")
    }
}

#[async_trait]
impl FixtureGenerator for ProcessGenerator {
    async fn generate(&self, output_dir: &Path) -> FixturesResult<()> {
        let command = self.command_line(output_dir);
        debug!("Executing: {} (in {})", command, self.working_dir.display());

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(output_dir)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| FixturesError::GeneratorLaunch {
                command: command.clone(),
                source,
            })?;

        if status.success() {
            return Ok(());
        }

        match status.code() {
            Some(code) => Err(FixturesError::GeneratorFailed { command, code }),
            None => Err(FixturesError::GeneratorSignaled { command }),
        }
    }

    fn describe(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
            .trim_end()
            .to_string()
    }
}

/// Owns the generated tree and drives a [`FixtureGenerator`] into it
pub struct GeneratorInvoker {
    generator: Arc<dyn FixtureGenerator>,
    output_dir: PathBuf,
}

impl GeneratorInvoker {
    pub fn new(generator: Arc<dyn FixtureGenerator>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            generator,
            output_dir: output_dir.into(),
        }
    }

    /// Path of the generated tree
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Clear the output directory, then regenerate it.
    ///
    /// A failed run removes whatever the generator managed to write, so the
    /// directory is either absent or the product of one successful run.
    pub async fn run(&self) -> FixturesResult<()> {
        if fsutil::remove_path(&self.output_dir).await? {
            info!("Removed previous {}", self.output_dir.display());
        }
        if let Some(parent) = self.output_dir.parent() {
            fsutil::ensure_dir(parent).await?;
        }

        info!(
            "Generating fixtures into {} with {}",
            self.output_dir.display(),
            self.generator.describe()
        );
        if let Err(e) = self.generator.generate(&self.output_dir).await {
            warn!("Generation failed, removing partial {}", self.output_dir.display());
            fsutil::remove_path(&self.output_dir).await?;
            return Err(e);
        }

        Ok(())
    }

    pub fn describe(&self) -> String {
        self.generator.describe()
    }
}
