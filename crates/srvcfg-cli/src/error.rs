//! Error types for srvcfg-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from srvcfg-core
    #[error(transparent)]
    Core(#[from] srvcfg_core::Error),

    /// Error from srvcfg-fs
    #[error(transparent)]
    Fs(#[from] srvcfg_fs::Error),

    /// Error from srvcfg-meta (schema or settings files)
    #[error(transparent)]
    Meta(#[from] srvcfg_meta::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// File watcher error
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
