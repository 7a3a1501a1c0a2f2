//! [`TestServer`] builder for on-disk server directories.

use std::fs;
use std::path::{Path, PathBuf};

use srvcfg_fs::ServerLayout;
use tempfile::TempDir;

use crate::memory::server_xml;

/// A temporary `wlp/usr/servers/<name>` tree.
///
/// # Example
///
/// ```rust,no_run
/// use srvcfg_test_utils::TestServer;
///
/// let server = TestServer::new();
/// server.write_server_xml(r#"<include location="extra.xml"/>"#);
/// server.write("extra.xml", "<server><logging traceSpecification=\"*=info\"/></server>");
/// let layout = server.layout();
/// ```
pub struct TestServer {
    temp_dir: TempDir,
    name: String,
}

impl Default for TestServer {
    fn default() -> Self {
        Self::new()
    }
}

impl TestServer {
    /// Create an empty server named `defaultServer`.
    pub fn new() -> Self {
        Self::named("defaultServer")
    }

    pub fn named(name: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let server = Self {
            temp_dir,
            name: name.to_string(),
        };
        fs::create_dir_all(server.server_dir()).unwrap();
        fs::create_dir_all(server.install_dir().join("etc")).unwrap();
        server
    }

    /// The `wlp` install directory.
    pub fn install_dir(&self) -> PathBuf {
        self.temp_dir.path().join("wlp")
    }

    /// The `wlp/usr` user directory.
    pub fn user_dir(&self) -> PathBuf {
        self.install_dir().join("usr")
    }

    pub fn server_dir(&self) -> PathBuf {
        self.user_dir().join("servers").join(&self.name)
    }

    /// Layout derived from the conventional directory structure.
    pub fn layout(&self) -> ServerLayout {
        ServerLayout::from_server_dir(self.server_dir())
    }

    /// Write `content` to `path`, relative to the server directory.
    /// Parent directories are created as needed.
    pub fn write(&self, path: &str, content: &str) -> PathBuf {
        write_file(&self.server_dir().join(path), content)
    }

    /// Write `server.xml` with `body` wrapped in `<server>`.
    pub fn write_server_xml(&self, body: &str) -> PathBuf {
        self.write("server.xml", &server_xml(body))
    }

    pub fn write_default_dropin(&self, name: &str, body: &str) -> PathBuf {
        self.write(&format!("configDropins/defaults/{name}"), &server_xml(body))
    }

    pub fn write_override_dropin(&self, name: &str, body: &str) -> PathBuf {
        self.write(&format!("configDropins/overrides/{name}"), &server_xml(body))
    }

    /// Write the per-server `server.env`.
    pub fn write_server_env(&self, content: &str) -> PathBuf {
        self.write("server.env", content)
    }

    /// Write a file under `wlp/usr/shared`.
    pub fn write_shared(&self, path: &str, content: &str) -> PathBuf {
        write_file(&self.user_dir().join("shared").join(path), content)
    }

    /// Write the install-wide `wlp/etc/server.env`.
    pub fn write_install_env(&self, content: &str) -> PathBuf {
        write_file(&self.install_dir().join("etc").join("server.env"), content)
    }

    /// Delete a file relative to the server directory.
    pub fn remove(&self, path: &str) {
        fs::remove_file(self.server_dir().join(path)).unwrap();
    }

    /// Absolute path of a file relative to the server directory.
    pub fn path(&self, path: &str) -> PathBuf {
        self.server_dir().join(path)
    }

    /// Assert that `path` (relative to the server directory) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.server_dir().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("failed to create {}: {e}", parent.display()));
    }
    fs::write(path, content).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    path.to_path_buf()
}
