//! Archive cache keyed by version tag
//!
//! Each version tag maps to exactly one file,
//! `<cache-dir>/<output-dir-name>-<tag>.tar.gz`. Once present the file is
//! never rewritten: a cache hit is decided by presence alone.
//!
//! # Write protocol
//!
//! Downloads stream into a hidden sibling (`.<file-name>.<random>.part`)
//! which is synced and renamed over the final name only after the whole body
//! arrived. A failed fetch drops the temporary, so the final name is never
//! observed half-written. A process killed mid-download can leave a `.part`
//! file behind; [`ArchiveCache::remove`] sweeps those.

pub mod fetch;

pub use fetch::{ArchiveFetcher, HttpFetcher};

use crate::config::SourceConfig;
use crate::error::{FixturesError, FixturesResult};
use crate::fsutil;
use crate::version::VersionTag;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const ARCHIVE_SUFFIX: &str = ".tar.gz";
const PART_SUFFIX: &str = ".part";

/// A freshly downloaded archive
#[derive(Debug, Clone)]
pub struct FetchedArchive {
    /// Final cache path
    pub path: PathBuf,
    /// Body size in bytes
    pub size_bytes: u64,
    /// Hex SHA-256 of the body
    pub sha256: String,
}

/// Details about a cached archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub sha256: String,
}

/// On-disk archive cache
pub struct ArchiveCache {
    dir: PathBuf,
    name: String,
    source: SourceConfig,
    fetcher: Arc<dyn ArchiveFetcher>,
}

impl ArchiveCache {
    /// Create a cache storing archives named after `name` inside `dir`
    pub fn new(
        dir: impl Into<PathBuf>,
        name: impl Into<String>,
        source: SourceConfig,
        fetcher: Arc<dyn ArchiveFetcher>,
    ) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            source,
            fetcher,
        }
    }

    /// Cache path for `tag`
    pub fn archive_path(&self, tag: &VersionTag) -> PathBuf {
        self.dir
            .join(format!("{}-{}{}", self.name, tag, ARCHIVE_SUFFIX))
    }

    /// Remote URL for `tag`
    pub fn archive_url(&self, tag: &VersionTag) -> String {
        self.source.archive_url(tag)
    }

    /// Whether the archive for `tag` is cached
    pub async fn contains(&self, tag: &VersionTag) -> FixturesResult<bool> {
        Ok(fsutil::modified(&self.archive_path(tag)).await?.is_some())
    }

    /// Return the cached archive for `tag`, fetching it on a miss
    pub async fn ensure(&self, tag: &VersionTag) -> FixturesResult<PathBuf> {
        let path = self.archive_path(tag);
        if self.contains(tag).await? {
            debug!("Archive cache hit: {}", path.display());
            return Ok(path);
        }

        debug!("Archive cache miss: {}", path.display());
        Ok(self.fetch(tag).await?.path)
    }

    /// Download the archive for `tag` into the cache unconditionally
    pub async fn fetch(&self, tag: &VersionTag) -> FixturesResult<FetchedArchive> {
        let url = self.archive_url(tag);
        let path = self.archive_path(tag);
        fsutil::ensure_dir(&self.dir).await?;

        info!("Fetching {}", url);
        let fetcher = Arc::clone(&self.fetcher);
        let dir = self.dir.clone();
        let target = path.clone();
        let fetched = tokio::task::spawn_blocking(move || {
            download(fetcher.as_ref(), &url, &dir, &target)
        })
        .await
        .map_err(|e| FixturesError::Internal(format!("download task failed: {}", e)))??;

        info!(
            "Cached {} ({} bytes, sha256 {})",
            fetched.path.display(),
            fetched.size_bytes,
            fetched.sha256
        );
        Ok(fetched)
    }

    /// Remove the archive for `tag` plus any interrupted downloads.
    /// Returns whether the archive itself existed.
    pub async fn remove(&self, tag: &VersionTag) -> FixturesResult<bool> {
        let path = self.archive_path(tag);
        let removed = fsutil::remove_path(&path).await?;
        if removed {
            info!("Removed {}", path.display());
        }

        fsutil::sweep_stale(&self.dir, &format!(".{}-", self.name), PART_SUFFIX).await?;
        Ok(removed)
    }

    /// Size and digest of the cached archive for `tag`, if present
    pub async fn inspect(&self, tag: &VersionTag) -> FixturesResult<Option<ArchiveInfo>> {
        let path = self.archive_path(tag);
        if !self.contains(tag).await? {
            return Ok(None);
        }

        tokio::task::spawn_blocking(move || {
            let mut file = File::open(&path)
                .map_err(|e| FixturesError::io(format!("opening {}", path.display()), e))?;
            let mut writer = DigestWriter::new(io::sink());
            io::copy(&mut file, &mut writer)
                .map_err(|e| FixturesError::io(format!("reading {}", path.display()), e))?;
            let (size_bytes, sha256) = writer.finish();
            Ok(Some(ArchiveInfo {
                path,
                size_bytes,
                sha256,
            }))
        })
        .await
        .map_err(|e| FixturesError::Internal(format!("digest task failed: {}", e)))?
    }
}

/// Stream `url` into a temporary sibling of `target` and rename on success
fn download(
    fetcher: &dyn ArchiveFetcher,
    url: &str,
    dir: &Path,
    target: &Path,
) -> FixturesResult<FetchedArchive> {
    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| FixturesError::Internal(format!("bad archive path {}", target.display())))?;

    let mut part = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name))
        .suffix(PART_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| FixturesError::io(format!("creating temporary file in {}", dir.display()), e))?;

    let part_path = part.path().to_path_buf();
    let (size_bytes, sha256) = {
        let mut writer = DigestWriter::new(BufWriter::new(part.as_file_mut()));
        fetcher.fetch(url, &mut writer)?;
        writer
            .flush()
            .map_err(|e| FixturesError::io(format!("writing {}", part_path.display()), e))?;
        writer.finish()
    };

    if size_bytes == 0 {
        return Err(FixturesError::fetch(url, "empty response body"));
    }

    part.as_file()
        .sync_all()
        .map_err(|e| FixturesError::io(format!("syncing {}", part_path.display()), e))?;
    part.persist(target)
        .map_err(|e| FixturesError::io(format!("moving archive to {}", target.display()), e.error))?;

    Ok(FetchedArchive {
        path: target.to_path_buf(),
        size_bytes,
        sha256,
    })
}

/// Writer that hashes and counts everything passing through
struct DigestWriter<W> {
    inner: W,
    hasher: Sha256,
    count: u64,
}

impl<W: Write> DigestWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            count: 0,
        }
    }

    fn finish(self) -> (u64, String) {
        (self.count, hex::encode(self.hasher.finalize()))
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
