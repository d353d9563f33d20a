//! Filesystem helpers shared by the cache, extractor and generator

use crate::error::{FixturesError, FixturesResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::warn;

/// Remove a file or directory tree. Returns `false` if nothing was there.
pub async fn remove_path(path: &Path) -> FixturesResult<bool> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(FixturesError::io(format!("inspecting {}", path.display()), e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FixturesError::io(format!("removing {}", path.display()), e)),
    }
}

/// Blocking variant of [`remove_path`] for use inside `spawn_blocking`
pub fn remove_path_blocking(path: &Path) -> FixturesResult<bool> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(FixturesError::io(format!("inspecting {}", path.display()), e)),
    };

    let result = if metadata.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    result
        .map(|()| true)
        .map_err(|e| FixturesError::io(format!("removing {}", path.display()), e))
}

/// Modification time of `path`, or `None` if it does not exist
pub async fn modified(path: &Path) -> FixturesResult<Option<SystemTime>> {
    match fs::metadata(path).await {
        Ok(m) => m
            .modified()
            .map(Some)
            .map_err(|e| FixturesError::io(format!("reading mtime of {}", path.display()), e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FixturesError::io(format!("inspecting {}", path.display()), e)),
    }
}

/// Remove leftovers of interrupted runs: entries in `dir` whose name starts
/// with `prefix` and ends with `suffix`.
pub async fn sweep_stale(dir: &Path, prefix: &str, suffix: &str) -> FixturesResult<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(FixturesError::io(format!("reading {}", dir.display()), e)),
    };

    let mut removed = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FixturesError::io(format!("reading {}", dir.display()), e))?
    {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(prefix) && name.ends_with(suffix) {
            let path = entry.path();
            warn!("Removing stale {}", path.display());
            if remove_path(&path).await? {
                removed.push(path);
            }
        }
    }

    Ok(removed)
}

/// Create `dir` and its parents
pub async fn ensure_dir(dir: &Path) -> FixturesResult<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| FixturesError::io(format!("creating directory {}", dir.display()), e))
}
