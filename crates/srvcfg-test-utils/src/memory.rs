//! In-memory servers.
//!
//! Fast fixtures for engine tests that do not need a real filesystem.

use std::sync::Arc;

use srvcfg_fs::{MemoryProvider, NormalizedPath, ServerLayout};

/// Server directory used by every [`MemoryServer`].
pub const MEMORY_SERVER_DIR: &str = "/wlp/usr/servers/test";

/// Wrap `body` in a `<server>` document.
pub fn server_xml(body: &str) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<server>\n{body}\n</server>\n")
}

/// A server rooted at [`MEMORY_SERVER_DIR`] and backed by a `MemoryProvider`.
pub struct MemoryServer {
    pub layout: ServerLayout,
    /// Shared so background workers can read while tests edit files
    pub provider: Arc<MemoryProvider>,
}

impl Default for MemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryServer {
    pub fn new() -> Self {
        Self {
            layout: ServerLayout::from_server_dir(MEMORY_SERVER_DIR),
            provider: Arc::new(MemoryProvider::new()),
        }
    }

    /// Absolute path of `path`, relative to the server directory.
    pub fn path(&self, path: &str) -> NormalizedPath {
        self.layout.server_dir.join(path)
    }

    /// Builder: add a raw file relative to the server directory.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.write(path, content);
        self
    }

    /// Builder: add a `<server>` document relative to the server directory.
    pub fn with_config(self, path: &str, body: &str) -> Self {
        self.with_file(path, &server_xml(body))
    }

    /// Builder: set the body of `server.xml`.
    pub fn with_server_xml(self, body: &str) -> Self {
        self.with_config("server.xml", body)
    }

    /// Add or replace a raw file relative to the server directory.
    pub fn write(&self, path: &str, content: &str) -> NormalizedPath {
        let full = self.path(path);
        self.provider.insert(full.clone(), content.as_bytes().to_vec());
        full
    }

    pub fn remove(&self, path: &str) -> bool {
        self.provider.remove(&self.path(path))
    }
}
