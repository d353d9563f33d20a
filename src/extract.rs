//! Archive extraction into the fixture tree
//!
//! The archive is unpacked into a staging directory beside the output
//! directory, with the single top-level directory stripped. Only a fully
//! validated extraction is swapped into place, so the output directory is
//! always absent or a complete copy of exactly one archive.
//!
//! A sidecar stamp (`.<name>.source`) next to the tree records which archive
//! it came from. It is removed before the old tree and written after the new
//! one is in place, so a missing or mismatched stamp means "re-extract".

use crate::error::{FixturesError, FixturesResult};
use crate::fsutil;
use flate2::read::GzDecoder;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};
use tracing::{debug, info};

const STAGING_SUFFIX: &str = ".partial";
const STAMP_SUFFIX: &str = ".source";

/// Result of a successful extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Final output directory
    pub path: PathBuf,
    /// Top-level directory name that was stripped
    pub stripped: String,
    /// Number of entries written
    pub entries: usize,
}

/// Owns the extracted fixture tree
pub struct Extractor {
    root: PathBuf,
    name: String,
}

impl Extractor {
    /// Extract into `<root>/<name>`
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
        }
    }

    /// Path of the extracted tree
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.name)
    }

    fn staging_prefix(&self) -> String {
        format!(".{}.", self.name)
    }

    fn stamp_path(&self) -> PathBuf {
        self.root.join(format!(".{}{}", self.name, STAMP_SUFFIX))
    }

    /// File name of the archive the current tree was extracted from
    pub async fn extracted_from(&self) -> FixturesResult<Option<String>> {
        let stamp = self.stamp_path();
        match tokio::fs::read_to_string(&stamp).await {
            Ok(contents) => Ok(Some(contents.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FixturesError::io(format!("reading {}", stamp.display()), e)),
        }
    }

    /// Whether the tree exists and was extracted from `archive`
    pub async fn is_extracted_from(&self, archive: &Path) -> FixturesResult<bool> {
        if fsutil::modified(&self.output_dir()).await?.is_none() {
            return Ok(false);
        }
        Ok(self.extracted_from().await? == Some(archive_name(archive)))
    }

    /// Replace the output directory with the contents of `archive`
    pub async fn extract(&self, archive: &Path) -> FixturesResult<Extraction> {
        fsutil::ensure_dir(&self.root).await?;

        let root = self.root.clone();
        let output = self.output_dir();
        let prefix = self.staging_prefix();
        let stamp = self.stamp_path();
        let archive = archive.to_path_buf();

        info!("Extracting {} into {}", archive.display(), output.display());
        let extraction = tokio::task::spawn_blocking(move || {
            extract_blocking(&archive, &root, &output, &prefix, &stamp)
        })
        .await
        .map_err(|e| FixturesError::Internal(format!("extraction task failed: {}", e)))??;

        info!(
            "Extracted {} entries from {}/",
            extraction.entries, extraction.stripped
        );
        Ok(extraction)
    }

    /// Remove the extracted tree and any staging directories left by an
    /// interrupted extraction. Returns whether the tree existed.
    pub async fn clean(&self) -> FixturesResult<bool> {
        let output = self.output_dir();
        fsutil::remove_path(&self.stamp_path()).await?;
        let removed = fsutil::remove_path(&output).await?;
        if removed {
            info!("Removed {}", output.display());
        }

        fsutil::sweep_stale(&self.root, &self.staging_prefix(), STAGING_SUFFIX).await?;
        Ok(removed)
    }
}

fn extract_blocking(
    archive: &Path,
    root: &Path,
    output: &Path,
    prefix: &str,
    stamp: &Path,
) -> FixturesResult<Extraction> {
    let stage = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(STAGING_SUFFIX)
        .tempdir_in(root)
        .map_err(|e| FixturesError::io(format!("creating staging directory in {}", root.display()), e))?;
    debug!("Staging extraction in {}", stage.path().display());

    // On error the staging directory is dropped and removed
    let (stripped, entries) = unpack_stripped(archive, stage.path())?;

    fsutil::remove_path_blocking(stamp)?;
    fsutil::remove_path_blocking(output)?;
    fs::rename(stage.path(), output).map_err(|e| {
        FixturesError::io(
            format!("moving {} to {}", stage.path().display(), output.display()),
            e,
        )
    })?;
    // Renamed into place; the staging path no longer exists
    let _ = stage.keep();
    fs::write(stamp, archive_name(archive))
        .map_err(|e| FixturesError::io(format!("writing {}", stamp.display()), e))?;

    Ok(Extraction {
        path: output.to_path_buf(),
        stripped,
        entries,
    })
}

fn archive_name(archive: &Path) -> String {
    archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Unpack `archive` into `dest`, stripping the one top-level directory.
/// Returns the stripped name and the number of entries written.
fn unpack_stripped(archive: &Path, dest: &Path) -> FixturesResult<(String, usize)> {
    let malformed = |reason: String| FixturesError::archive_format(archive, reason);

    let file = File::open(archive)
        .map_err(|e| FixturesError::io(format!("opening archive {}", archive.display()), e))?;
    let mut tar = Archive::new(GzDecoder::new(BufReader::new(file)));
    let entries = tar
        .entries()
        .map_err(|e| malformed(format!("reading archive: {}", e)))?;

    let mut top: Option<OsString> = None;
    let mut written = 0;

    for entry in entries {
        let mut entry = entry.map_err(|e| malformed(format!("reading entry: {}", e)))?;
        let kind = entry.header().entry_type();
        if kind.is_pax_global_extensions() {
            continue;
        }

        let path = entry
            .path()
            .map_err(|e| malformed(format!("invalid entry path: {}", e)))?
            .into_owned();
        let (first, rest) = split_top(&path).map_err(&malformed)?;

        match &top {
            Some(existing) if *existing != first => {
                return Err(malformed(format!(
                    "multiple top-level directories: {} and {}",
                    existing.to_string_lossy(),
                    first.to_string_lossy()
                )));
            }
            Some(_) => {}
            None => top = Some(first),
        }

        if rest.as_os_str().is_empty() {
            if kind.is_dir() {
                continue;
            }
            return Err(malformed(format!(
                "top-level entry {} is not a directory",
                path.display()
            )));
        }

        let target = dest.join(&rest);
        match kind {
            EntryType::Directory => {
                fs::create_dir_all(&target).map_err(|e| {
                    FixturesError::io(format!("creating {}", target.display()), e)
                })?;
            }
            EntryType::Regular | EntryType::Continuous | EntryType::Symlink => {
                if kind == EntryType::Symlink {
                    check_link_target(&entry, &path).map_err(&malformed)?;
                }
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| {
                        FixturesError::io(format!("creating {}", parent.display()), e)
                    })?;
                }
                entry
                    .unpack(&target)
                    .map_err(|e| malformed(format!("unpacking {}: {}", path.display(), e)))?;
            }
            other => {
                return Err(malformed(format!(
                    "unsupported entry type {:?} for {}",
                    other,
                    path.display()
                )));
            }
        }
        written += 1;
    }

    match top {
        Some(top) if written > 0 => Ok((top.to_string_lossy().into_owned(), written)),
        _ => Err(malformed("archive contains no files".to_string())),
    }
}

/// Split an entry path into its top-level name and the remainder,
/// rejecting anything that could land outside the destination.
fn split_top(path: &Path) -> Result<(OsString, PathBuf), String> {
    let mut components = path.components();
    let first = match components.next() {
        Some(Component::Normal(name)) => name.to_os_string(),
        _ => return Err(format!("entry {} has no top-level directory", path.display())),
    };

    let mut rest = PathBuf::new();
    for component in components {
        match component {
            Component::Normal(part) => rest.push(part),
            Component::CurDir => {}
            _ => return Err(format!("unsafe entry path {}", path.display())),
        }
    }

    Ok((first, rest))
}

fn check_link_target<R: std::io::Read>(entry: &tar::Entry<'_, R>, path: &Path) -> Result<(), String> {
    let target = entry
        .link_name()
        .map_err(|e| format!("invalid link target for {}: {}", path.display(), e))?
        .ok_or_else(|| format!("symlink {} has no target", path.display()))?;

    let escapes = target
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(format!(
            "symlink {} points outside the archive: {}",
            path.display(),
            target.display()
        ));
    }
    Ok(())
}
