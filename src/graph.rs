//! Minimal file-based task graph
//!
//! Each task declares the path it produces, the paths it reads, and an
//! action. Building a target evaluates its dependencies first and skips any
//! task whose output is up to date: present, not older than any input, with
//! no input rebuilt during this run, and accepted by the action's own
//! freshness check.

use crate::error::{FixturesError, FixturesResult};
use crate::fsutil;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Work that produces a task's output
#[async_trait]
pub trait TaskAction: Send + Sync {
    async fn run(&self) -> FixturesResult<()>;

    /// Extra check applied when timestamps say the output is current
    async fn is_fresh(&self) -> FixturesResult<bool> {
        Ok(true)
    }
}

/// One node of the graph
pub struct Task<'a> {
    name: String,
    output: PathBuf,
    inputs: Vec<PathBuf>,
    action: Box<dyn TaskAction + 'a>,
}

impl<'a> Task<'a> {
    pub fn new(
        name: impl Into<String>,
        output: impl Into<PathBuf>,
        action: impl TaskAction + 'a,
    ) -> Self {
        Self {
            name: name.into(),
            output: output.into(),
            inputs: Vec::new(),
            action: Box::new(action),
        }
    }

    /// Declare an input path
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.inputs.push(path.into());
        self
    }
}

/// What a build did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Tasks whose action ran, in order
    pub ran: Vec<String>,
    /// Tasks found up to date
    pub skipped: Vec<String>,
}

impl BuildReport {
    pub fn did_run(&self, name: &str) -> bool {
        self.ran.iter().any(|n| n == name)
    }
}

/// A set of tasks keyed by output path
#[derive(Default)]
pub struct TaskGraph<'a> {
    tasks: Vec<Task<'a>>,
}

impl<'a> TaskGraph<'a> {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Add a task; two tasks may not produce the same output
    pub fn add(&mut self, task: Task<'a>) -> FixturesResult<&mut Self> {
        if self.producer(&task.output).is_some() {
            return Err(FixturesError::Internal(format!(
                "two tasks produce {}",
                task.output.display()
            )));
        }
        self.tasks.push(task);
        Ok(self)
    }

    fn producer(&self, output: &Path) -> Option<usize> {
        self.tasks.iter().position(|t| t.output == output)
    }

    /// Dependency-first order of the tasks needed for `target`
    fn plan(&self, target: &Path) -> FixturesResult<Vec<usize>> {
        fn visit(
            graph: &TaskGraph<'_>,
            index: usize,
            visiting: &mut HashSet<usize>,
            order: &mut Vec<usize>,
        ) -> FixturesResult<()> {
            if order.contains(&index) {
                return Ok(());
            }
            if !visiting.insert(index) {
                return Err(FixturesError::Internal(format!(
                    "dependency cycle through {}",
                    graph.tasks[index].name
                )));
            }
            for input in &graph.tasks[index].inputs {
                if let Some(dep) = graph.producer(input) {
                    visit(graph, dep, visiting, order)?;
                }
            }
            visiting.remove(&index);
            order.push(index);
            Ok(())
        }

        let index = self.producer(target).ok_or_else(|| {
            FixturesError::Internal(format!("no task produces {}", target.display()))
        })?;
        let mut order = Vec::new();
        visit(self, index, &mut HashSet::new(), &mut order)?;
        Ok(order)
    }

    /// Bring `target` up to date
    pub async fn build(&self, target: &Path) -> FixturesResult<BuildReport> {
        let mut report = BuildReport::default();
        let mut rebuilt: HashSet<&Path> = HashSet::new();

        for index in self.plan(target)? {
            let task = &self.tasks[index];

            if self.is_current(task, &rebuilt).await? {
                debug!("{}: up to date ({})", task.name, task.output.display());
                report.skipped.push(task.name.clone());
                continue;
            }

            debug!("{}: building {}", task.name, task.output.display());
            task.action.run().await?;

            if fsutil::modified(&task.output).await?.is_none() {
                return Err(FixturesError::Internal(format!(
                    "task {} did not produce {}",
                    task.name,
                    task.output.display()
                )));
            }
            rebuilt.insert(task.output.as_path());
            report.ran.push(task.name.clone());
        }

        Ok(report)
    }

    async fn is_current(&self, task: &Task<'_>, rebuilt: &HashSet<&Path>) -> FixturesResult<bool> {
        let Some(output_time) = fsutil::modified(&task.output).await? else {
            return Ok(false);
        };

        for input in &task.inputs {
            if rebuilt.contains(input.as_path()) {
                return Ok(false);
            }
            match fsutil::modified(input).await? {
                Some(input_time) if input_time > output_time => return Ok(false),
                Some(_) => {}
                None => {
                    return Err(FixturesError::Internal(format!(
                        "{} needs {}, which is missing and has no task",
                        task.name,
                        input.display()
                    )));
                }
            }
        }

        task.action.is_fresh().await
    }
}
