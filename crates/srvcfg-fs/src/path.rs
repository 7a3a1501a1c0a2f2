//! Lexically normalized paths
//!
//! Configuration files name each other with whatever separators and
//! `..` hops the author typed. Every path is reduced to one spelling with
//! forward slashes so the dependency graph and document cache can key on
//! it directly. Nothing here touches the filesystem except the explicit
//! `exists`/`is_dir`/`is_file` checks.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A path with forward slashes, no `.` or empty segments, and `..`
/// collapsed against its predecessor.
///
/// Two spellings of the same location produce equal values, so the type
/// is safe to use as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedPath {
    inner: String,
}

/// Leading part of a path that `..` can never remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root<'a> {
    Relative,
    Slash,
    /// `//server/share`
    Unc,
    /// `C:`
    Drive(&'a str),
}

impl Root<'_> {
    fn push_to(self, out: &mut String) {
        match self {
            Root::Relative => {}
            Root::Slash => out.push('/'),
            Root::Unc => out.push_str("//"),
            Root::Drive(letter) => {
                out.push_str(letter);
                out.push('/');
            }
        }
    }
}

fn split_root(path: &str) -> (Root<'_>, &str) {
    if let Some(rest) = path.strip_prefix("//").filter(|rest| !rest.starts_with('/')) {
        return (Root::Unc, rest);
    }
    if let Some(rest) = path.strip_prefix('/') {
        return (Root::Slash, rest);
    }
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return (Root::Drive(&path[..2]), &path[2..]);
    }
    (Root::Relative, path)
}

fn normalize(raw: &str) -> String {
    let raw = raw.replace('\\', "/");
    let (root, rest) = split_root(&raw);

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            // Clamped at the root; a relative path simply loses the hop.
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }

    let mut out = String::with_capacity(raw.len());
    root.push_to(&mut out);
    out.push_str(&segments.join("/"));
    out
}

impl NormalizedPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            inner: normalize(&path.as_ref().to_string_lossy()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Platform path for handing to `std::fs`.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// True for `/…`, `//server/…` and drive-letter paths.
    pub fn is_absolute(&self) -> bool {
        split_root(&self.inner).0 != Root::Relative
    }

    /// Resolve `segment` against this path the way an include location is
    /// resolved against its directory: a rooted segment stands alone.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        if self.inner.is_empty() || split_root(&segment).0 != Root::Relative {
            return Self::new(segment);
        }

        let mut joined = self.inner.clone();
        if !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(&segment);
        Self::new(joined)
    }

    /// The containing directory; `None` for a bare root or a single
    /// relative segment.
    pub fn parent(&self) -> Option<Self> {
        let (root, rest) = split_root(&self.inner);
        let rest = rest.trim_end_matches('/');
        if rest.is_empty() {
            return None;
        }

        let mut inner = String::new();
        root.push_to(&mut inner);
        match rest.rfind('/') {
            Some(cut) => inner.push_str(&rest[..cut]),
            None if root == Root::Relative => return None,
            None => {}
        }
        Some(Self { inner })
    }

    pub fn file_name(&self) -> Option<&str> {
        let (_, rest) = split_root(&self.inner);
        rest.trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
    }

    /// Text after the last dot of the file name. Dotfiles have none.
    pub fn extension(&self) -> Option<&str> {
        let (stem, ext) = self.file_name()?.rsplit_once('.')?;
        (!stem.is_empty()).then_some(ext)
    }

    /// Containment on whole segments: `/a/b` is inside `/a` but `/ab` is not.
    pub fn starts_with(&self, dir: &NormalizedPath) -> bool {
        if dir.inner.is_empty() {
            return true;
        }
        match self.inner.strip_prefix(dir.inner.as_str()) {
            Some("") => true,
            Some(tail) => tail.starts_with('/') || dir.inner.ends_with('/'),
            None => false,
        }
    }

    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

macro_rules! from_path_like {
    ($($source:ty),*) => {
        $(impl From<$source> for NormalizedPath {
            fn from(value: $source) -> Self {
                Self::new(value)
            }
        })*
    };
}

from_path_like!(&str, String, &Path, PathBuf);
