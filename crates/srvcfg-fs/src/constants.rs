//! Constants and enums for server filesystem paths.

use std::path::Path;

/// Well-known file and directory names of a server installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPath {
    /// The root configuration file of a server (`server.xml`)
    ServerXml,
    /// The per-server, shared and install-wide environment file (`server.env`)
    ServerEnv,
    /// The dropins root below the server config directory (`configDropins`)
    ConfigDropins,
    /// Lowest-precedence dropins folder (`defaults`)
    DefaultsDropins,
    /// Highest-precedence dropins folder (`overrides`)
    OverridesDropins,
    /// The `servers` directory below the user directory
    ServersDir,
    /// The `shared` directory below the user directory
    SharedDir,
    /// The `etc` directory below the install directory
    EtcDir,
    /// The `usr` user directory below the install directory
    UserDir,
}

impl ServerPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServerXml => "server.xml",
            Self::ServerEnv => "server.env",
            Self::ConfigDropins => "configDropins",
            Self::DefaultsDropins => "defaults",
            Self::OverridesDropins => "overrides",
            Self::ServersDir => "servers",
            Self::SharedDir => "shared",
            Self::EtcDir => "etc",
            Self::UserDir => "usr",
        }
    }
}

impl AsRef<Path> for ServerPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for ServerPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ServerPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
