//! Server directory layout
//!
//! A server lives at `<install>/usr/servers/<name>/`. Everything the
//! resolver needs outside the root `server.xml` (dropins folders, the
//! layered `server.env` files, predefined location variables) is derived
//! from that shape:
//!
//! ```text
//! <install>/
//!   etc/server.env                  install-wide environment
//!   usr/
//!     shared/server.env             shared environment
//!     shared/config/                shared.config.dir
//!     servers/<name>/
//!       server.xml                  root configuration
//!       server.env                  per-server environment
//!       configDropins/defaults/     lowest precedence
//!       configDropins/overrides/    highest precedence
//! ```

use crate::{NormalizedPath, ServerPath};

/// Resolved directories of one server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerLayout {
    /// The server config directory (`server.config.dir`)
    pub server_dir: NormalizedPath,
    /// The user directory (`wlp.user.dir`)
    pub user_dir: NormalizedPath,
    /// The install directory (`wlp.install.dir`)
    pub install_dir: NormalizedPath,
    /// The server output directory (`server.output.dir`)
    pub output_dir: NormalizedPath,
}

impl ServerLayout {
    /// Derive a layout from a server directory.
    ///
    /// When the directory does not sit in a `servers` folder, the user and
    /// install directories fall back to its parent; use the `with_*`
    /// builders to point them elsewhere.
    pub fn from_server_dir(server_dir: impl Into<NormalizedPath>) -> Self {
        let server_dir = server_dir.into();
        let parent = server_dir.parent().unwrap_or_else(|| server_dir.clone());

        let user_dir = if parent.file_name() == Some(ServerPath::ServersDir.as_str()) {
            parent.parent().unwrap_or_else(|| parent.clone())
        } else {
            parent
        };

        let install_dir = if user_dir.file_name() == Some(ServerPath::UserDir.as_str()) {
            user_dir.parent().unwrap_or_else(|| user_dir.clone())
        } else {
            user_dir.clone()
        };

        Self {
            output_dir: server_dir.clone(),
            server_dir,
            user_dir,
            install_dir,
        }
    }

    /// Override the user directory.
    pub fn with_user_dir(mut self, user_dir: impl Into<NormalizedPath>) -> Self {
        self.user_dir = user_dir.into();
        self
    }

    /// Override the install directory.
    pub fn with_install_dir(mut self, install_dir: impl Into<NormalizedPath>) -> Self {
        self.install_dir = install_dir.into();
        self
    }

    /// Override the output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<NormalizedPath>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// The server name, taken from the server directory name.
    pub fn server_name(&self) -> &str {
        self.server_dir.file_name().unwrap_or_default()
    }

    /// Path of the root configuration file.
    pub fn server_xml(&self) -> NormalizedPath {
        self.server_dir.join(ServerPath::ServerXml.as_str())
    }

    /// The lowest-precedence dropins folder.
    pub fn defaults_dropins_dir(&self) -> NormalizedPath {
        self.server_dir
            .join(ServerPath::ConfigDropins.as_str())
            .join(ServerPath::DefaultsDropins.as_str())
    }

    /// The highest-precedence dropins folder.
    pub fn overrides_dropins_dir(&self) -> NormalizedPath {
        self.server_dir
            .join(ServerPath::ConfigDropins.as_str())
            .join(ServerPath::OverridesDropins.as_str())
    }

    /// The `shared` directory below the user directory.
    pub fn shared_dir(&self) -> NormalizedPath {
        self.user_dir.join(ServerPath::SharedDir.as_str())
    }

    /// The layered environment files in increasing precedence:
    /// install-wide, shared, per-server.
    pub fn env_files(&self) -> [NormalizedPath; 3] {
        [
            self.install_dir
                .join(ServerPath::EtcDir.as_str())
                .join(ServerPath::ServerEnv.as_str()),
            self.shared_dir().join(ServerPath::ServerEnv.as_str()),
            self.server_dir.join(ServerPath::ServerEnv.as_str()),
        ]
    }

    /// Predefined location variables, in a stable order.
    pub fn predefined_variables(&self) -> Vec<(&'static str, String)> {
        let shared = self.shared_dir();
        vec![
            ("wlp.install.dir", self.install_dir.to_string()),
            ("wlp.user.dir", self.user_dir.to_string()),
            ("usr.extension.dir", self.user_dir.join("extension").to_string()),
            ("shared.app.dir", shared.join("apps").to_string()),
            ("shared.config.dir", shared.join("config").to_string()),
            ("shared.resource.dir", shared.join("resources").to_string()),
            ("shared.stackgroup.dir", shared.join("stackGroups").to_string()),
            ("server.config.dir", self.server_dir.to_string()),
            ("server.output.dir", self.output_dir.to_string()),
            ("wlp.server.name", self.server_name().to_string()),
        ]
    }
}
