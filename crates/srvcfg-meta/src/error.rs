//! Error types for srvcfg-meta

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] srvcfg_fs::Error),

    #[error("Invalid attribute type '{spec}': {message}")]
    InvalidAttributeType { spec: String, message: String },

    #[error("Invalid element kind: {kind}")]
    InvalidElementKind { kind: String },

    #[error("Invalid ignore rule '{rule}': expected <element>.<attribute>")]
    InvalidIgnoreRule { rule: String },
}
