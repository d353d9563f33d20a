//! In-process stand-ins for the network and the generator process

use crate::cache::ArchiveFetcher;
use crate::error::{FixturesError, FixturesResult};
use crate::generate::FixtureGenerator;
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tar::{EntryType, Header};

/// Raw archive entry; names are written unvalidated so malformed
/// archives can be produced
pub enum Entry<'a> {
    Dir(&'a str),
    File(&'a str, &'a str),
    Symlink(&'a str, &'a str),
    HardLink(&'a str, &'a str),
    PaxGlobal(&'a str),
}

/// Build a gzip tarball from raw entries
pub fn tarball_entries(entries: &[Entry<'_>]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    for entry in entries {
        let empty: &[u8] = &[];
        let (name, kind, link, data): (&str, EntryType, Option<&str>, &[u8]) = match *entry {
            Entry::Dir(name) => (name, EntryType::Directory, None, empty),
            Entry::File(name, body) => (name, EntryType::Regular, None, body.as_bytes()),
            Entry::Symlink(name, target) => (name, EntryType::Symlink, Some(target), empty),
            Entry::HardLink(name, target) => (name, EntryType::Link, Some(target), empty),
            Entry::PaxGlobal(comment) => (
                "pax_global_header",
                EntryType::XGlobalHeader,
                None,
                comment.as_bytes(),
            ),
        };

        let mut header = Header::new_gnu();
        header.set_entry_type(kind);
        header.set_size(data.len() as u64);
        header.set_mode(if kind == EntryType::Directory { 0o755 } else { 0o644 });
        header.set_mtime(1_600_000_000);
        {
            let old = header.as_old_mut();
            old.name[..name.len()].copy_from_slice(name.as_bytes());
            if let Some(link) = link {
                old.linkname[..link.len()].copy_from_slice(link.as_bytes());
            }
        }
        header.set_cksum();
        builder.append(&header, data).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// Build a `git archive` style tarball: pax header, one top-level
/// directory, files beneath it
pub fn tarball(top: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let top_dir = format!("{}/", top);
    let names: Vec<String> = files.iter().map(|(p, _)| format!("{}/{}", top, p)).collect();

    let mut entries = vec![Entry::PaxGlobal("52 comment=0123456789abcdef0123456789abcdef01234567\n")];
    entries.push(Entry::Dir(&top_dir));
    for (name, (_, body)) in names.iter().zip(files) {
        entries.push(Entry::File(name, body));
    }
    tarball_entries(&entries)
}

/// Snapshot of a directory tree: relative path -> file contents
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let rel = path.strip_prefix(root).unwrap().to_path_buf();
            if path.is_dir() {
                out.insert(rel, Vec::new());
                walk(root, &path, out);
            } else {
                out.insert(rel, std::fs::read(&path).unwrap());
            }
        }
    }

    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

/// Serves fixed bodies per URL and counts requests
#[derive(Default)]
pub struct StaticFetcher {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, url: &str, body: Vec<u8>) -> Self {
        self.set(url, body);
        self
    }

    pub fn set(&self, url: &str, body: Vec<u8>) {
        self.bodies.lock().unwrap().insert(url.to_string(), body);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ArchiveFetcher for StaticFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> FixturesResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let bodies = self.bodies.lock().unwrap();
        let body = bodies
            .get(url)
            .ok_or_else(|| FixturesError::fetch(url, "http status: 404"))?;
        sink.write_all(body).unwrap();
        Ok(body.len() as u64)
    }
}

/// Writes some bytes, then fails as if the connection dropped
pub struct FailingFetcher {
    bytes: usize,
}

impl FailingFetcher {
    pub fn after_bytes(bytes: usize) -> Self {
        Self { bytes }
    }
}

impl ArchiveFetcher for FailingFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> FixturesResult<u64> {
        sink.write_all(&vec![0x1f; self.bytes]).unwrap();
        Err(FixturesError::fetch(url, "connection reset by peer"))
    }
}

/// Generator writing a fixed set of files, optionally failing afterwards
#[derive(Default)]
pub struct StubGenerator {
    files: Vec<(String, String)>,
    fail: bool,
    runs: AtomicUsize,
}

impl StubGenerator {
    pub fn writing(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FixtureGenerator for StubGenerator {
    async fn generate(&self, output_dir: &Path) -> FixturesResult<()> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        std::fs::create_dir_all(output_dir).unwrap();
        for (path, contents) in &self.files {
            let target = output_dir.join(path);
            std::fs::create_dir_all(target.parent().unwrap()).unwrap();
            std::fs::write(target, contents).unwrap();
        }

        if self.fail {
            std::fs::write(output_dir.join(format!("partial-{}.json", run)), "{").unwrap();
            return Err(FixturesError::GeneratorFailed {
                command: "stub".to_string(),
                code: 1,
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "stub generator".to_string()
    }
}
