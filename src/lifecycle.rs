//! Named fixture operations
//!
//! `acquire` is the only operation with internal ordering (archive before
//! extraction) and runs through a [`TaskGraph`]. The clean operations and
//! `generate` are independent of it and of each other.

use crate::cache::{ArchiveCache, ArchiveFetcher, ArchiveInfo, HttpFetcher};
use crate::config::Config;
use crate::error::FixturesResult;
use crate::extract::Extractor;
use crate::fsutil;
use crate::generate::{FixtureGenerator, GeneratorInvoker, ProcessGenerator};
use crate::graph::{Task, TaskAction, TaskGraph};
use crate::version::VersionTag;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const FETCH_TASK: &str = "fetch-archive";
const EXTRACT_TASK: &str = "extract-archive";

/// Outcome of [`LifecycleController::acquire`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireReport {
    /// Cached archive used
    pub archive: PathBuf,
    /// Extracted fixture tree
    pub output_dir: PathBuf,
    /// Whether the archive was downloaded in this run
    pub fetched: bool,
    /// Whether the tree was (re)extracted in this run
    pub extracted: bool,
}

/// State of the extracted tree relative to the cached archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    /// No extracted tree
    Missing,
    /// Extracted and not older than the archive
    Current,
    /// Present but older than the archive, or the archive is gone
    Stale,
}

/// Snapshot of on-disk fixture state
#[derive(Debug, Clone)]
pub struct FixtureStatus {
    pub tag: VersionTag,
    pub url: String,
    pub archive_path: PathBuf,
    pub archive: Option<ArchiveInfo>,
    pub output_dir: PathBuf,
    pub extracted: TreeState,
    pub generate_dir: PathBuf,
    pub generated: bool,
}

/// Entry point for the fixture operations
pub struct LifecycleController {
    config: Config,
    cache: ArchiveCache,
    extractor: Extractor,
    generator: GeneratorInvoker,
}

impl LifecycleController {
    /// Wire the controller with explicit collaborators
    pub fn new(
        config: Config,
        root: &Path,
        fetcher: Arc<dyn ArchiveFetcher>,
        generator: Arc<dyn FixtureGenerator>,
    ) -> Self {
        let fixtures = &config.fixtures;
        let cache_dir = match &fixtures.cache_dir {
            Some(dir) => root.join(dir),
            None => root.to_path_buf(),
        };

        let cache = ArchiveCache::new(
            cache_dir,
            fixtures.output_dir.clone(),
            config.source.clone(),
            fetcher,
        );
        let extractor = Extractor::new(root, fixtures.output_dir.clone());
        let generator = GeneratorInvoker::new(generator, root.join(&fixtures.generate_dir));

        Self {
            config,
            cache,
            extractor,
            generator,
        }
    }

    /// Wire the controller with the HTTP fetcher and the external generator
    pub fn from_config(config: Config, root: &Path, show_progress: bool) -> Self {
        let timeout = match config.source.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let fetcher = Arc::new(HttpFetcher::new(timeout, show_progress));
        let generator = Arc::new(ProcessGenerator::new(&config.generator, root));
        Self::new(config, root, fetcher, generator)
    }

    /// Version tag this controller provisions
    pub fn tag(&self) -> &VersionTag {
        &self.config.fixtures.version_tag
    }

    /// Cache path of the archive for the current tag
    pub fn archive_path(&self) -> PathBuf {
        self.cache.archive_path(self.tag())
    }

    /// Directory the archive is extracted into
    pub fn extracted_dir(&self) -> PathBuf {
        self.extractor.output_dir()
    }

    pub fn generator_description(&self) -> String {
        self.generator.describe()
    }

    /// Ensure the archive is cached and the tree extracted from it
    pub async fn acquire(&self) -> FixturesResult<AcquireReport> {
        let tag = self.tag();
        let archive = self.archive_path();
        let output_dir = self.extracted_dir();

        let mut graph = TaskGraph::new();
        graph.add(Task::new(
            FETCH_TASK,
            &archive,
            FetchArchive {
                cache: &self.cache,
                tag,
            },
        ))?;
        graph.add(
            Task::new(
                EXTRACT_TASK,
                &output_dir,
                ExtractArchive {
                    extractor: &self.extractor,
                    archive: &archive,
                },
            )
            .input(&archive),
        )?;

        let report = graph.build(&output_dir).await?;
        debug!("acquire: ran {:?}, skipped {:?}", report.ran, report.skipped);
        drop(graph);

        Ok(AcquireReport {
            fetched: report.did_run(FETCH_TASK),
            extracted: report.did_run(EXTRACT_TASK),
            archive,
            output_dir,
        })
    }

    /// Remove the extracted tree. Returns whether it existed.
    pub async fn clean_extracted(&self) -> FixturesResult<bool> {
        self.extractor.clean().await
    }

    /// Remove the cached archive for the current tag. Returns whether it existed.
    pub async fn clean_archives(&self) -> FixturesResult<bool> {
        self.cache.remove(self.tag()).await
    }

    /// Remove the extracted tree, then the cached archive
    pub async fn clean_all(&self) -> FixturesResult<()> {
        self.clean_extracted().await?;
        self.clean_archives().await?;
        Ok(())
    }

    /// Regenerate the generated tree from scratch
    pub async fn generate(&self) -> FixturesResult<PathBuf> {
        self.generator.run().await?;
        Ok(self.generator.output_dir().to_path_buf())
    }

    /// Report what is on disk without changing anything
    pub async fn status(&self) -> FixturesResult<FixtureStatus> {
        let tag = self.tag().clone();
        let archive_path = self.cache.archive_path(&tag);
        let archive = self.cache.inspect(&tag).await?;
        let output_dir = self.extractor.output_dir();

        let archive_time = fsutil::modified(&archive_path).await?;
        let extracted = match (fsutil::modified(&output_dir).await?, archive_time) {
            (None, _) => TreeState::Missing,
            (Some(tree), Some(archive))
                if tree >= archive && self.extractor.is_extracted_from(&archive_path).await? =>
            {
                TreeState::Current
            }
            (Some(_), _) => TreeState::Stale,
        };

        let generate_dir = self.generator.output_dir().to_path_buf();
        let generated = fsutil::modified(&generate_dir).await?.is_some();

        Ok(FixtureStatus {
            url: self.cache.archive_url(&tag),
            tag,
            archive_path,
            archive,
            output_dir,
            extracted,
            generate_dir,
            generated,
        })
    }
}

struct FetchArchive<'a> {
    cache: &'a ArchiveCache,
    tag: &'a VersionTag,
}

#[async_trait]
impl TaskAction for FetchArchive<'_> {
    async fn run(&self) -> FixturesResult<()> {
        self.cache.ensure(self.tag).await?;
        Ok(())
    }
}

struct ExtractArchive<'a> {
    extractor: &'a Extractor,
    archive: &'a Path,
}

#[async_trait]
impl TaskAction for ExtractArchive<'_> {
    async fn run(&self) -> FixturesResult<()> {
        self.extractor.extract(self.archive).await?;
        Ok(())
    }

    // A tree extracted from another tag's archive can be newer than ours
    async fn is_fresh(&self) -> FixturesResult<bool> {
        self.extractor.is_extracted_from(self.archive).await
    }
}
