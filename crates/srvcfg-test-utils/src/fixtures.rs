//! Checked-in sample installations under `test-fixtures/servers`.
//!
//! Fixtures are copied into a temporary directory before use so tests may
//! edit them freely.

use std::fs;
use std::path::{Path, PathBuf};

use srvcfg_fs::ServerLayout;
use tempfile::TempDir;

/// Root of the checked-in fixture tree.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("test-fixtures")
        .join("servers")
}

/// A private copy of the `wlp` fixture installation.
pub struct FixtureInstall {
    temp_dir: TempDir,
}

impl FixtureInstall {
    pub fn copy() -> Self {
        let temp_dir = TempDir::new().unwrap();
        copy_dir(&fixtures_dir().join("wlp"), &temp_dir.path().join("wlp"));
        Self { temp_dir }
    }

    pub fn install_dir(&self) -> PathBuf {
        self.temp_dir.path().join("wlp")
    }

    pub fn user_dir(&self) -> PathBuf {
        self.install_dir().join("usr")
    }

    pub fn server_dir(&self, name: &str) -> PathBuf {
        self.user_dir().join("servers").join(name)
    }

    pub fn layout(&self, name: &str) -> ServerLayout {
        ServerLayout::from_server_dir(self.server_dir(name))
    }

    /// Write a file relative to the install directory.
    pub fn write(&self, path: &str, content: &str) -> PathBuf {
        let full = self.install_dir().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full, content).unwrap();
        full
    }

    pub fn path(&self, path: &str) -> PathBuf {
        self.install_dir().join(path)
    }
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}
