//! File-content providers
//!
//! The resolver never touches the filesystem directly; it reads through a
//! [`FileProvider`]. [`DiskProvider`] serves real server directories and
//! [`MemoryProvider`] serves in-memory trees for tests and editors holding
//! unsaved buffers.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::sync::{PoisonError, RwLock};

use crate::{Error, NormalizedPath, Result, io};

/// Source of configuration file content.
pub trait FileProvider: Send + Sync {
    /// Read a file. Returns `Ok(None)` when no file exists at `path`.
    fn read(&self, path: &NormalizedPath) -> Result<Option<Vec<u8>>>;

    /// List the regular files directly inside `dir`, sorted by file name.
    ///
    /// A missing directory yields an empty list.
    fn list_files(&self, dir: &NormalizedPath) -> Result<Vec<NormalizedPath>>;

    /// Physical identity of `path`, used to detect the same file reached
    /// through different spellings.
    fn canonicalize(&self, path: &NormalizedPath) -> NormalizedPath {
        path.clone()
    }
}

/// Provider backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskProvider;

impl DiskProvider {
    pub fn new() -> Self {
        Self
    }
}

impl FileProvider for DiskProvider {
    fn read(&self, path: &NormalizedPath) -> Result<Option<Vec<u8>>> {
        io::read_bytes_if_exists(path)
    }

    fn list_files(&self, dir: &NormalizedPath) -> Result<Vec<NormalizedPath>> {
        let native = dir.to_native();
        let entries = match fs::read_dir(&native) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(&native, e)),
        };

        let mut files: Vec<NormalizedPath> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .map(NormalizedPath::from)
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    fn canonicalize(&self, path: &NormalizedPath) -> NormalizedPath {
        match dunce::canonicalize(path.to_native()) {
            Ok(canonical) => NormalizedPath::new(canonical),
            Err(_) => path.clone(),
        }
    }
}

/// In-memory provider keyed by normalized path.
///
/// Content can be replaced at any time; readers see a consistent snapshot
/// per call.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    files: RwLock<BTreeMap<NormalizedPath, Vec<u8>>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file.
    pub fn insert(&self, path: impl Into<NormalizedPath>, content: impl Into<Vec<u8>>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), content.into());
    }

    /// Builder-style [`MemoryProvider::insert`].
    pub fn with_file(self, path: impl Into<NormalizedPath>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    /// Remove a file, returning whether it existed.
    pub fn remove(&self, path: &NormalizedPath) -> bool {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
            .is_some()
    }

    /// Number of files held.
    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FileProvider for MemoryProvider {
    fn read(&self, path: &NormalizedPath) -> Result<Option<Vec<u8>>> {
        Ok(self
            .files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned())
    }

    fn list_files(&self, dir: &NormalizedPath) -> Result<Vec<NormalizedPath>> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let mut listed: Vec<NormalizedPath> = files
            .keys()
            .filter(|path| path.parent().as_ref() == Some(dir))
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(listed)
    }
}
