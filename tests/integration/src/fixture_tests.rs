//! Resolution of the checked-in sample installation
//!
//! Exercises the full stack on disk: layout and env files (srvcfg-fs),
//! the built-in schema (srvcfg-meta), XML parsing (srvcfg-document) and
//! the engine (srvcfg-core).

use pretty_assertions::assert_eq;
use srvcfg_core::{ConfigEngine, DiagnosticKind, ResolvedConfiguration, Severity, Tier};
use srvcfg_fs::{DiskProvider, NormalizedPath};
use srvcfg_meta::{SchemaMetadata, ValidationSettings};
use srvcfg_test_utils::FixtureInstall;

fn engine() -> ConfigEngine {
    ConfigEngine::new(SchemaMetadata::with_builtins(), ValidationSettings::default())
}

fn resolve(install: &FixtureInstall, server: &str) -> ResolvedConfiguration {
    engine()
        .resolve(&install.layout(server), &DiskProvider::new())
        .unwrap()
}

fn kinds(config: &ResolvedConfiguration) -> Vec<DiagnosticKind> {
    config.diagnostics.iter().map(|d| d.kind).collect()
}

fn data_source_property(config: &ResolvedConfiguration, name: &str) -> Option<String> {
    let data_source = config.element("dataSource", Some("appDS"))?;
    let properties = data_source.children.iter().find(|c| c.name == "properties")?;
    Some(config.resolver().resolve(properties.attr(name)?).value)
}

mod webapp {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chain_runs_defaults_includes_root_overrides() {
        let install = FixtureInstall::copy();
        let config = resolve(&install, "webapp");

        let names: Vec<&str> = config
            .chain_paths()
            .into_iter()
            .map(|p| p.file_name().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["00-executor.xml", "http.xml", "datasource.xml", "server.xml", "10-ports.xml"]
        );
    }

    #[test]
    fn only_notices_are_reported() {
        let install = FixtureInstall::copy();
        let config = resolve(&install, "webapp");

        assert!(
            config.diagnostics.iter().all(|d| d.severity == Severity::Info),
            "{:#?}",
            config.diagnostics
        );
        let kinds = kinds(&config);
        assert_eq!(kinds.iter().filter(|k| **k == DiagnosticKind::Override).count(), 2);

        let optional = config
            .diagnostics
            .iter()
            .find(|d| d.kind == DiagnosticKind::IncludeOptionalNotFound)
            .unwrap();
        assert_eq!(optional.line, 13);
        assert_eq!(
            optional.file,
            NormalizedPath::new(install.server_dir("webapp").join("server.xml"))
        );
    }

    #[test]
    fn override_dropin_wins_for_attributes_and_variables() {
        let install = FixtureInstall::copy();
        let config = resolve(&install, "webapp");

        let https = config
            .lookup("httpEndpoint", Some("defaultHttpEndpoint"), "httpsPort")
            .unwrap();
        assert_eq!(https.resolved.as_deref(), Some("9444"));
        assert_eq!(https.location.file.file_name(), Some("10-ports.xml"));
        assert_eq!(https.location.line, 4);

        let context_root = config.lookup("webApplication", Some("shop"), "contextRoot").unwrap();
        assert_eq!(context_root.raw, "${app.context}");
        assert_eq!(context_root.resolved.as_deref(), Some("/store"));

        let winner = config.variables.winner("app.context").unwrap();
        assert_eq!(winner.tier, Tier::OverrideDropins);
    }

    #[test]
    fn root_beats_default_dropin() {
        let install = FixtureInstall::copy();
        let config = resolve(&install, "webapp");

        let max_files = config.lookup("logging", None, "maxFiles").unwrap();
        assert_eq!(max_files.resolved.as_deref(), Some("5"));

        // Only set by the defaults dropin.
        let max_threads = config.lookup("executor", None, "maxThreads").unwrap();
        assert_eq!(max_threads.resolved.as_deref(), Some("50"));
    }

    #[test]
    fn env_files_layer_by_location() {
        let install = FixtureInstall::copy();
        let config = resolve(&install, "webapp");

        // Install-wide only
        let log_dir = config.lookup("logging", None, "logDirectory").unwrap();
        assert_eq!(log_dir.resolved.as_deref(), Some("/var/log/wlp"));

        // Shared overrides install-wide
        assert_eq!(
            data_source_property(&config, "serverName").as_deref(),
            Some("db.shared.local")
        );

        // Per-server
        let http = config
            .lookup("httpEndpoint", Some("defaultHttpEndpoint"), "httpPort")
            .unwrap();
        assert_eq!(http.resolved.as_deref(), Some("9080"));
    }

    #[test]
    fn shared_include_uses_predefined_location_and_default_value() {
        let install = FixtureInstall::copy();
        let config = resolve(&install, "webapp");

        assert_eq!(data_source_property(&config, "portNumber").as_deref(), Some("5432"));
        assert!(config.element("jdbcDriver", Some("postgres")).is_some());
        assert_eq!(config.enabled_features(), vec!["servlet-6.0", "jdbc-4.2"]);
    }

    #[test]
    fn dependencies_cover_shared_files_and_missing_includes() {
        let install = FixtureInstall::copy();
        let config = resolve(&install, "webapp");
        let dependencies = &config.dependencies;

        let shared = NormalizedPath::new(install.path("usr/shared/config/datasource.xml"));
        assert!(dependencies.files.contains(&shared));
        assert!(dependencies.depends_on(&shared));

        let optional = NormalizedPath::new(
            install.server_dir("webapp").join("includes").join("optional-tuning.xml"),
        );
        assert!(dependencies.missing.contains(&optional));

        let new_dropin = NormalizedPath::new(
            install
                .server_dir("webapp")
                .join("configDropins")
                .join("overrides")
                .join("20-new.xml"),
        );
        assert!(dependencies.depends_on(&new_dropin));
    }

    #[test]
    fn resolving_copies_is_deterministic() {
        let install = FixtureInstall::copy();
        let first = serde_json::to_string(&resolve(&install, "webapp").diagnostics).unwrap();
        let second = serde_json::to_string(&resolve(&install, "webapp").diagnostics).unwrap();
        assert_eq!(first, second);
    }
}

mod broken {
    use super::*;
    use pretty_assertions::assert_eq;

    fn find(config: &ResolvedConfiguration, kind: DiagnosticKind) -> &srvcfg_core::Diagnostic {
        config
            .diagnostics
            .iter()
            .find(|d| d.kind == kind)
            .unwrap_or_else(|| panic!("no {kind} in {:#?}", config.diagnostics))
    }

    #[test]
    fn include_problems_are_errors() {
        let install = FixtureInstall::copy();
        let config = resolve(&install, "broken");

        let not_found = find(&config, DiagnosticKind::IncludeNotFound);
        assert_eq!(not_found.severity, Severity::Error);
        assert_eq!(not_found.line, 7);

        let unresolved = find(&config, DiagnosticKind::IncludeUnresolved);
        assert_eq!(unresolved.severity, Severity::Error);
        assert_eq!(unresolved.line, 8);
        assert!(config.has_errors());
    }

    #[test]
    fn value_and_schema_problems_are_located() {
        let install = FixtureInstall::copy();
        let config = resolve(&install, "broken");

        let invalid = find(&config, DiagnosticKind::InvalidType);
        assert_eq!(invalid.line, 10);
        assert_eq!(invalid.args[1], "90a0");

        let attribute = find(&config, DiagnosticKind::UnrecognizedAttribute);
        assert_eq!(attribute.severity, Severity::Warning);
        assert!(attribute.quick_fixes.contains(&srvcfg_core::QuickFix::BestMatch {
            replacement: "httpsPort".to_string()
        }));

        let unavailable = find(&config, DiagnosticKind::UnavailableElement);
        assert_eq!(unavailable.line, 11);
        assert_eq!(unavailable.args[0], "dataSource");
    }

    #[test]
    fn misspelled_variable_suggests_declared_name() {
        let install = FixtureInstall::copy();
        let config = resolve(&install, "broken");

        let undefined = config
            .diagnostics
            .iter()
            .find(|d| d.kind == DiagnosticKind::VariableUndefined && d.line == 12)
            .unwrap();
        assert_eq!(undefined.severity, Severity::Warning);
        assert!(undefined.quick_fixes.contains(&srvcfg_core::QuickFix::BestMatch {
            replacement: "maxFiles".to_string()
        }));
    }
}
