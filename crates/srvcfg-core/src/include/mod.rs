//! Include & dropins resolution
//!
//! Produces the contributing files of one root configuration (the include
//! chain), the include edges between them, and the diagnostics raised
//! while following them.

mod resolver;

pub use resolver::{IncludeResolver, Traversal};

use std::sync::Arc;

use serde::Serialize;
use srvcfg_document::{ConfigDocument, OnConflict};
use srvcfg_fs::NormalizedPath;

use crate::variables::Tier;

/// Index of a file within one resolution pass.
pub type FileId = usize;

/// Which synthetic layer a file contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layer {
    DefaultDropins,
    /// The root file and everything it includes
    Config,
    OverrideDropins,
}

impl Layer {
    /// Variable precedence tier of declarations in this layer.
    pub fn tier(&self) -> Tier {
        match self {
            Layer::DefaultDropins => Tier::DefaultDropins,
            Layer::Config => Tier::Config,
            Layer::OverrideDropins => Tier::OverrideDropins,
        }
    }
}

/// One physical file reached during resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationFile {
    pub id: FileId,
    /// Path as first reached
    pub path: NormalizedPath,
    /// Physical identity
    pub canonical: NormalizedPath,
    /// Directory relative includes resolve against
    pub dir: NormalizedPath,
    pub layer: Layer,
    /// Parsed tree; `None` when the file is malformed
    #[serde(skip)]
    pub document: Option<Arc<ConfigDocument>>,
    /// Outgoing include edges in document order
    pub includes: Vec<usize>,
    /// Dropins folders implied by this file (root only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropins: Vec<NormalizedPath>,
}

/// Outcome of following one `<include>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum EdgeTarget {
    /// First time the target was reached; it contributes through this edge
    Resolved { file: FileId },
    /// Target already reached elsewhere (duplicate or cycle)
    AlreadyIncluded { file: FileId },
    /// The location resolved but no file exists there
    Missing { path: NormalizedPath },
    /// The location references an undefined variable
    Unresolved { variable: String },
    /// The directive has no location
    NoLocation,
}

impl EdgeTarget {
    /// The reached file, resolved or already included.
    pub fn file(&self) -> Option<FileId> {
        match self {
            EdgeTarget::Resolved { file } | EdgeTarget::AlreadyIncluded { file } => Some(*file),
            _ => None,
        }
    }
}

/// A directed edge of the include graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeEdge {
    pub from: FileId,
    pub line: u32,
    /// Raw `location` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub optional: bool,
    pub on_conflict: OnConflict,
    pub target: EdgeTarget,
}
