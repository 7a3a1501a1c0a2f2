//! Error types for srvcfg-core
//!
//! Configuration problems are never errors here; they are reported as
//! [`crate::Diagnostic`] values. These variants cover infrastructure
//! failures only.

/// Result type for srvcfg-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in srvcfg-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The root configuration file does not exist
    #[error("Server configuration not found at {path}")]
    ServerNotFound { path: String },

    /// The revalidation worker for a root has stopped
    #[error("Revalidation worker for {root} is not running")]
    WorkerStopped { root: String },

    /// Filesystem error from srvcfg-fs
    #[error(transparent)]
    Fs(#[from] srvcfg_fs::Error),

    /// Metadata error from srvcfg-meta
    #[error(transparent)]
    Meta(#[from] srvcfg_meta::Error),

    /// Document error from srvcfg-document
    #[error(transparent)]
    Document(#[from] srvcfg_document::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
