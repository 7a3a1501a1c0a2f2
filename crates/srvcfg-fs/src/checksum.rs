//! Content identity for parsed configuration files
//!
//! A [`ContentChecksum`] is the SHA-256 digest of a file's raw bytes,
//! rendered as `sha256:<hex>`. Two reads of a file with the same checksum
//! parse to the same document, so the digest serves as a cache key.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 digest of file content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContentChecksum(String);

impl ContentChecksum {
    pub fn of(bytes: &[u8]) -> Self {
        Self(format!("sha256:{:x}", Sha256::digest(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            ContentChecksum::of(b"hello world").as_str(),
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn whitespace_changes_identity() {
        assert_ne!(
            ContentChecksum::of(b"<server/>"),
            ContentChecksum::of(b"<server />")
        );
    }
}
