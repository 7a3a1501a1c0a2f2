//! Error types for srvcfg-fs
//!
//! Absence is not an error here: providers report a missing file as
//! `None`. These variants cover reads that fail outright and settings or
//! schema files that cannot be decoded.

use std::path::PathBuf;

/// Result type for srvcfg-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in srvcfg-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or listing a path failed for a reason other than absence
    #[error("Cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A settings or schema file is not valid in its format
    #[error("{format} syntax error in {}: {message}", path.display())]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Settings and schema files are TOML, JSON or YAML
    #[error("Unsupported settings format '{extension}' (expected toml, json, yaml or yml)")]
    UnsupportedFormat { extension: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the underlying I/O error is `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
