//! Error types for srvcfg-document

/// Result type for srvcfg-document operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a file produces no element tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Malformed XML at line {line}, column {column}: {message}")]
    Malformed {
        line: u32,
        column: u32,
        message: String,
    },

    #[error("File is not valid UTF-8: {message}")]
    Encoding { message: String },
}

impl Error {
    /// 1-based line the failure points at.
    pub fn line(&self) -> u32 {
        match self {
            Error::Malformed { line, .. } => *line,
            Error::Encoding { .. } => 1,
        }
    }
}
