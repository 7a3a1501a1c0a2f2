//! Parsed-document cache shared across resolutions
//!
//! Keyed by `(path, content checksum)` so unchanged files are parsed once
//! no matter how many roots include them. Insertion is atomic per key:
//! concurrent resolutions asking for the same content parse it once.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use srvcfg_document::ConfigDocument;
use srvcfg_fs::{ContentChecksum, NormalizedPath};

/// A parse outcome; malformed files are cached too.
pub type ParsedDocument = std::result::Result<Arc<ConfigDocument>, srvcfg_document::Error>;

#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: DashMap<(NormalizedPath, ContentChecksum), ParsedDocument>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached parse of `bytes`, parsing on first sight.
    ///
    /// New content for a path evicts that path's older entries.
    pub fn get_or_parse(&self, path: &NormalizedPath, bytes: &[u8]) -> ParsedDocument {
        let checksum = ContentChecksum::of(bytes);
        let key = (path.clone(), checksum);

        if let Some(entry) = self.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(%path, "Document cache hit");
            return entry.value().clone();
        }

        self.retain_paths(path, &key.1);
        let mut parsed_here = false;
        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| {
                parsed_here = true;
                ConfigDocument::parse(bytes).map(Arc::new)
            })
            .value()
            .clone();

        if parsed_here {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(%path, "Parsed document");
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        entry
    }

    /// Drop entries for `path` whose checksum differs from `keep`.
    pub fn retain_paths(&self, path: &NormalizedPath, keep: &ContentChecksum) {
        self.entries
            .retain(|(cached_path, checksum), _| cached_path != path || checksum == keep);
    }

    /// Drop every entry for `path`.
    pub fn invalidate(&self, path: &NormalizedPath) {
        self.entries.retain(|(cached_path, _), _| cached_path != path);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}
