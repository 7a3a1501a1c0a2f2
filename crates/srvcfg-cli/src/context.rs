//! Server context construction
//!
//! Turns command-line paths into a [`ServerLayout`] and a [`ConfigEngine`]
//! configured with the schema and validation settings for that server.

use std::path::Path;

use srvcfg_core::{ConfigEngine, ResolvedConfiguration};
use srvcfg_fs::{DiskProvider, NormalizedPath, ServerLayout};
use srvcfg_meta::{SchemaLoader, SchemaMetadata, SettingsResolver};

use crate::cli::ServerArgs;
use crate::error::{CliError, Result};

/// A server ready to be resolved from disk.
#[derive(Debug)]
pub struct ServerContext {
    pub layout: ServerLayout,
    pub engine: ConfigEngine,
}

impl ServerContext {
    pub fn load(args: &ServerArgs) -> Result<Self> {
        let mut layout = server_layout(&args.server_dir)?;
        if let Some(user_dir) = &args.user_dir {
            layout = layout.with_user_dir(absolute(user_dir)?);
        }
        if let Some(install_dir) = &args.install_dir {
            layout = layout.with_install_dir(absolute(install_dir)?);
        }
        let engine = build_engine(&layout.server_dir, args.schema.as_deref())?;
        Ok(Self { layout, engine })
    }

    pub fn resolve(&self) -> Result<ResolvedConfiguration> {
        Ok(self.engine.resolve(&self.layout, &DiskProvider::new())?)
    }
}

/// Layout for a server directory given on the command line.
pub fn server_layout(server_dir: &Path) -> Result<ServerLayout> {
    let server_dir = absolute(server_dir)?;
    if !server_dir.is_dir() {
        return Err(CliError::user(format!(
            "Server directory not found: {server_dir}"
        )));
    }
    Ok(ServerLayout::from_server_dir(server_dir))
}

/// Engine with the built-in schema, optionally extended from `schema`,
/// and the validation settings layered for `server_dir`.
pub fn build_engine(server_dir: &NormalizedPath, schema: Option<&Path>) -> Result<ConfigEngine> {
    let metadata = match schema {
        Some(path) => SchemaLoader::new().load_with_builtins(&absolute(path)?)?,
        None => SchemaMetadata::with_builtins(),
    };
    let settings = SettingsResolver::new(server_dir.clone()).resolve()?;
    tracing::debug!(
        %server_dir,
        threshold = settings.threshold,
        report_overrides = settings.report_overrides,
        "Validation settings resolved"
    );
    Ok(ConfigEngine::new(metadata, settings))
}

fn absolute(path: &Path) -> Result<NormalizedPath> {
    Ok(NormalizedPath::new(std::path::absolute(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use srvcfg_test_utils::TestServer;

    #[test]
    fn layout_from_standard_tree() {
        let server = TestServer::named("app");
        server.write_server_xml("");

        let layout = server_layout(&server.server_dir()).unwrap();
        assert_eq!(layout.server_name(), "app");
        assert_eq!(layout.user_dir.to_native(), server.user_dir());
        assert_eq!(layout.install_dir.to_native(), server.install_dir());
    }

    #[test]
    fn missing_server_dir_is_user_error() {
        let server = TestServer::new();
        let err = server_layout(&server.path("nope")).unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
        assert!(err.to_string().contains("Server directory not found"));
    }

    #[test]
    fn server_settings_reach_engine() {
        let server = TestServer::new();
        server.write_server_xml("");
        server.write(".srvcfg.toml", "threshold = 90\nreport_overrides = false\n");

        let layout = server_layout(&server.server_dir()).unwrap();
        let engine = build_engine(&layout.server_dir, None).unwrap();
        assert_eq!(engine.settings().threshold, 90);
        assert!(!engine.settings().report_overrides);
    }
}
