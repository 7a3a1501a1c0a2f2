//! Root dependency tracking
//!
//! Each resolved root records the files that shaped its result so a file
//! change can be mapped back to the roots that need revalidation.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use srvcfg_fs::{NormalizedPath, ServerLayout};

use crate::include::Traversal;

/// Paths a single root depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootDependencies {
    /// The server directory identifying the root
    pub root: NormalizedPath,
    /// Files read during resolution, under both their spelled and physical paths
    pub files: BTreeSet<NormalizedPath>,
    /// Include targets that did not exist; creating one changes the result
    pub missing: BTreeSet<NormalizedPath>,
    /// Dropins directories; any file appearing in them changes the result
    pub watched_dirs: BTreeSet<NormalizedPath>,
    pub env_files: BTreeSet<NormalizedPath>,
}

impl RootDependencies {
    /// Dependencies known before anything has been read.
    pub fn skeleton(layout: &ServerLayout) -> Self {
        Self {
            root: layout.server_dir.clone(),
            files: BTreeSet::from([layout.server_xml()]),
            missing: BTreeSet::new(),
            watched_dirs: BTreeSet::from([
                layout.defaults_dropins_dir(),
                layout.overrides_dropins_dir(),
            ]),
            env_files: layout.env_files().into_iter().collect(),
        }
    }

    pub fn from_traversal(layout: &ServerLayout, traversal: &Traversal) -> Self {
        let mut deps = Self::skeleton(layout);
        for file in &traversal.files {
            deps.files.insert(file.path.clone());
            deps.files.insert(file.canonical.clone());
        }
        deps.missing.extend(traversal.missing.iter().cloned());
        deps
    }

    /// Whether a change to `path` can affect this root.
    pub fn depends_on(&self, path: &NormalizedPath) -> bool {
        if self.files.contains(path)
            || self.missing.contains(path)
            || self.env_files.contains(path)
            || self.watched_dirs.contains(path)
        {
            return true;
        }
        path.parent()
            .is_some_and(|parent| self.watched_dirs.contains(&parent))
    }
}

/// Dependencies of every registered root, keyed by server directory.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    roots: BTreeMap<NormalizedPath, RootDependencies>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the recorded dependencies of one root.
    pub fn update(&mut self, deps: RootDependencies) {
        self.roots.insert(deps.root.clone(), deps);
    }

    pub fn remove(&mut self, root: &NormalizedPath) -> bool {
        self.roots.remove(root).is_some()
    }

    pub fn get(&self, root: &NormalizedPath) -> Option<&RootDependencies> {
        self.roots.get(root)
    }

    /// Roots affected by a change to `path`, in sorted order.
    pub fn dependents(&self, path: &NormalizedPath) -> Vec<NormalizedPath> {
        self.roots
            .values()
            .filter(|deps| deps.depends_on(path))
            .map(|deps| deps.root.clone())
            .collect()
    }

    pub fn roots(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.roots.keys()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
