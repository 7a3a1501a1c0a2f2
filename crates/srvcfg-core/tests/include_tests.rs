//! Tests for include and dropins traversal

use pretty_assertions::assert_eq;
use srvcfg_core::{
    ConfigEngine, DiagnosticKind, EdgeTarget, Error, Layer, ResolvedConfiguration, Severity,
};
use srvcfg_meta::{SchemaMetadata, ValidationSettings};
use srvcfg_test_utils::MemoryServer;

fn resolve(server: &MemoryServer) -> ResolvedConfiguration {
    ConfigEngine::new(SchemaMetadata::with_builtins(), ValidationSettings::default())
        .resolve(&server.layout, server.provider.as_ref())
        .expect("root exists")
}

fn of_kind(resolved: &ResolvedConfiguration, kind: DiagnosticKind) -> Vec<(String, u32, Severity)> {
    resolved
        .diagnostics
        .iter()
        .filter(|d| d.kind == kind)
        .map(|d| {
            let file = d.file.file_name().unwrap_or_default().to_string();
            (file, d.line, d.severity)
        })
        .collect()
}

fn chain_names(resolved: &ResolvedConfiguration) -> Vec<String> {
    resolved
        .chain_paths()
        .iter()
        .map(|p| p.file_name().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn missing_root_is_an_error() {
    let server = MemoryServer::new();
    let engine = ConfigEngine::new(SchemaMetadata::with_builtins(), ValidationSettings::default());

    let result = engine.resolve(&server.layout, server.provider.as_ref());
    assert!(matches!(result, Err(Error::ServerNotFound { .. })));
}

#[test]
fn chain_is_post_order_with_root_last() {
    let server = MemoryServer::new()
        .with_server_xml(
            r#"<include location="a.xml"/>
<include location="b.xml"/>"#,
        )
        .with_config("a.xml", r#"<include location="nested/c.xml"/>"#)
        .with_config("b.xml", "")
        .with_config("nested/c.xml", "");

    let resolved = resolve(&server);

    assert_eq!(chain_names(&resolved), vec!["c.xml", "a.xml", "b.xml", "server.xml"]);
    assert!(resolved.diagnostics.is_empty(), "{:?}", resolved.diagnostics);
}

#[test]
fn nested_locations_are_relative_to_the_including_file() {
    let server = MemoryServer::new()
        .with_server_xml(r#"<include location="conf/a.xml"/>"#)
        .with_config("conf/a.xml", r#"<include location="b.xml"/>"#)
        .with_config("conf/b.xml", "");

    let resolved = resolve(&server);

    assert!(
        resolved
            .chain_paths()
            .iter()
            .any(|p| p.as_str() == "/wlp/usr/servers/test/conf/b.xml")
    );
}

#[test]
fn missing_required_include_is_an_error_and_optional_is_info() {
    let server = MemoryServer::new().with_server_xml(
        r#"<include location="gone.xml"/>
<include location="maybe.xml" optional="true"/>"#,
    );

    let resolved = resolve(&server);

    assert_eq!(
        of_kind(&resolved, DiagnosticKind::IncludeNotFound),
        vec![("server.xml".to_string(), 3, Severity::Error)]
    );
    assert_eq!(
        of_kind(&resolved, DiagnosticKind::IncludeOptionalNotFound),
        vec![("server.xml".to_string(), 4, Severity::Info)]
    );
    assert_eq!(resolved.dependencies.missing.len(), 2);
}

#[test]
fn failed_include_does_not_stop_siblings() {
    let server = MemoryServer::new()
        .with_server_xml(
            r#"<include location="gone.xml"/>
<include/>
<include location="ok.xml"/>"#,
        )
        .with_config("ok.xml", "");

    let resolved = resolve(&server);

    assert_eq!(chain_names(&resolved), vec!["ok.xml", "server.xml"]);
    assert_eq!(
        of_kind(&resolved, DiagnosticKind::IncludeLocationMissing),
        vec![("server.xml".to_string(), 4, Severity::Error)]
    );
}

#[test]
fn unresolved_location_shows_the_literal_reference() {
    let server = MemoryServer::new()
        .with_server_xml(r#"<include location="${config.dir}/a.xml" optional="true"/>"#);

    let resolved = resolve(&server);
    let diagnostic = resolved
        .diagnostics
        .iter()
        .find(|d| d.kind == DiagnosticKind::IncludeUnresolved)
        .expect("unresolved include reported");

    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.line, 3);
    assert_eq!(diagnostic.args[1], "${config.dir}");
    assert!(diagnostic.message.contains("${config.dir}"));
    assert_eq!(
        resolved.edges[0].target,
        EdgeTarget::Unresolved {
            variable: "${config.dir}".to_string()
        }
    );
}

#[test]
fn location_uses_variables_declared_before_it() {
    let server = MemoryServer::new()
        .with_server_xml(
            r#"<variable name="dir" value="conf"/>
<include location="${dir}/a.xml"/>
<include location="${later}/b.xml"/>
<variable name="later" value="conf"/>"#,
        )
        .with_config("conf/a.xml", "")
        .with_config("conf/b.xml", "");

    let resolved = resolve(&server);

    assert_eq!(chain_names(&resolved), vec!["a.xml", "server.xml"]);
    assert_eq!(
        of_kind(&resolved, DiagnosticKind::IncludeUnresolved),
        vec![("server.xml".to_string(), 5, Severity::Error)]
    );
}

#[test]
fn predefined_variables_resolve_in_locations() {
    let server = MemoryServer::new()
        .with_server_xml(r#"<include location="${server.config.dir}/extra.xml"/>"#)
        .with_config("extra.xml", "");

    let resolved = resolve(&server);

    assert_eq!(chain_names(&resolved), vec!["extra.xml", "server.xml"]);
}

#[test]
fn direct_duplicate_reports_once_at_first_include() {
    let server = MemoryServer::new()
        .with_server_xml(
            r#"<include location="a.xml"/>
<include location="b.xml"/>
<include location="a.xml"/>"#,
        )
        .with_config("a.xml", "")
        .with_config("b.xml", "");

    let resolved = resolve(&server);

    assert_eq!(
        of_kind(&resolved, DiagnosticKind::IncludeDuplicate),
        vec![("server.xml".to_string(), 3, Severity::Info)]
    );
    assert!(matches!(resolved.edges[2].target, EdgeTarget::AlreadyIncluded { .. }));
    assert_eq!(chain_names(&resolved), vec!["a.xml", "b.xml", "server.xml"]);
}

#[test]
fn diamond_reports_at_common_ancestor_only() {
    let server = MemoryServer::new()
        .with_server_xml(r#"<include location="mid.xml"/>"#)
        .with_config(
            "mid.xml",
            r#"<include location="left.xml"/>
<include location="right.xml"/>"#,
        )
        .with_config("left.xml", r#"<include location="shared.xml"/>"#)
        .with_config("right.xml", r#"<include location="shared.xml"/>"#)
        .with_config("shared.xml", "");

    let resolved = resolve(&server);

    assert_eq!(
        of_kind(&resolved, DiagnosticKind::IncludeDuplicate),
        vec![("mid.xml".to_string(), 3, Severity::Info)]
    );
}

#[test]
fn only_the_outermost_duplicate_is_named() {
    let server = MemoryServer::new()
        .with_server_xml(
            r#"<include location="a.xml"/>
<include location="a.xml"/>"#,
        )
        .with_config("a.xml", r#"<include location="b.xml"/>"#)
        .with_config("b.xml", "");

    let resolved = resolve(&server);
    let duplicates: Vec<&str> = resolved
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::IncludeDuplicate)
        .map(|d| d.args[0].as_str())
        .collect();

    assert_eq!(duplicates, vec!["/wlp/usr/servers/test/a.xml"]);
}

#[test]
fn cycles_terminate_without_diagnostics() {
    let server = MemoryServer::new()
        .with_server_xml(r#"<include location="a.xml"/>"#)
        .with_config("a.xml", r#"<include location="b.xml"/>"#)
        .with_config("b.xml", r#"<include location="a.xml"/><include location="server.xml"/>"#);

    let resolved = resolve(&server);

    assert_eq!(chain_names(&resolved), vec!["b.xml", "a.xml", "server.xml"]);
    assert!(resolved.diagnostics.is_empty(), "{:?}", resolved.diagnostics);
}

#[test]
fn deep_chains_do_not_exhaust_the_stack() {
    let mut server = MemoryServer::new().with_server_xml(r#"<include location="f0.xml"/>"#);
    for i in 0..500 {
        server = server.with_config(&format!("f{i}.xml"), &format!(r#"<include location="f{}.xml"/>"#, i + 1));
    }
    server = server.with_config("f500.xml", "");

    let resolved = resolve(&server);

    assert_eq!(resolved.chain.len(), 502);
}

#[test]
fn dropins_wrap_the_root_in_name_order() {
    let server = MemoryServer::new()
        .with_server_xml("")
        .with_config("configDropins/defaults/b.xml", "")
        .with_config("configDropins/defaults/a.xml", "")
        .with_config("configDropins/overrides/z.xml", "")
        .with_file("configDropins/overrides/notes.txt", "ignored")
        .with_config("configDropins/overrides/m.xml", "");

    let resolved = resolve(&server);

    assert_eq!(
        chain_names(&resolved),
        vec!["a.xml", "b.xml", "server.xml", "m.xml", "z.xml"]
    );
    let layers: Vec<Layer> = resolved.chain.iter().map(|&id| resolved.files[id].layer).collect();
    assert_eq!(
        layers,
        vec![
            Layer::DefaultDropins,
            Layer::DefaultDropins,
            Layer::Config,
            Layer::OverrideDropins,
            Layer::OverrideDropins
        ]
    );
}

#[test]
fn file_shared_with_a_default_dropin_stays_in_the_config_tier() {
    let server = MemoryServer::new()
        .with_server_xml(r#"<include location="common.xml"/>"#)
        .with_config(
            "common.xml",
            r#"<variable name="x" value="common"/>
<logging maxFiles="2"/>"#,
        )
        .with_config(
            "configDropins/defaults/d.xml",
            r#"<include location="${server.config.dir}/common.xml"/>
<variable name="x" value="default"/>
<logging maxFiles="1"/>"#,
        );

    let resolved = resolve(&server);

    let chain: Vec<(String, Layer)> = resolved
        .chain
        .iter()
        .map(|&id| {
            let file = &resolved.files[id];
            (file.path.file_name().unwrap_or_default().to_string(), file.layer)
        })
        .collect();
    assert_eq!(
        chain,
        vec![
            ("d.xml".to_string(), Layer::DefaultDropins),
            ("common.xml".to_string(), Layer::Config),
            ("server.xml".to_string(), Layer::Config),
        ]
    );
    assert_eq!(resolved.variables.effective("x"), Some("common"));
    assert_eq!(
        resolved.lookup("logging", None, "maxFiles").map(|v| v.raw).as_deref(),
        Some("2")
    );
}

#[test]
fn default_dropin_variables_reach_root_include_locations() {
    let server = MemoryServer::new()
        .with_server_xml(r#"<include location="${tuning}.xml"/>"#)
        .with_config("configDropins/defaults/vars.xml", r#"<variable name="tuning" value="fast"/>"#)
        .with_config("fast.xml", r#"<executor maxThreads="8"/>"#);

    let resolved = resolve(&server);

    assert!(of_kind(&resolved, DiagnosticKind::IncludeUnresolved).is_empty());
    assert_eq!(chain_names(&resolved), vec!["vars.xml", "fast.xml", "server.xml"]);
}

#[test]
fn malformed_file_contributes_nothing() {
    let server = MemoryServer::new()
        .with_server_xml(
            r#"<include location="broken.xml"/>
<include location="fine.xml"/>"#,
        )
        .with_file("broken.xml", "<server>\n<include location=\"fine.xml\">\n</server>")
        .with_config("fine.xml", "");

    let resolved = resolve(&server);
    let malformed = of_kind(&resolved, DiagnosticKind::MalformedXml);

    assert_eq!(malformed.len(), 1);
    assert_eq!(malformed[0].0, "broken.xml");
    assert_eq!(malformed[0].2, Severity::Error);
    assert_eq!(chain_names(&resolved), vec!["broken.xml", "fine.xml", "server.xml"]);
}

#[test]
fn invalid_on_conflict_suggests_a_policy() {
    let server = MemoryServer::new()
        .with_server_xml(r#"<include location="a.xml" onConflict="REPLCE"/>"#)
        .with_config("a.xml", "");

    let resolved = resolve(&server);
    let diagnostic = resolved
        .diagnostics
        .iter()
        .find(|d| d.kind == DiagnosticKind::InvalidOnConflict)
        .expect("invalid onConflict reported");

    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(
        diagnostic.quick_fixes,
        vec![srvcfg_core::QuickFix::BestMatch {
            replacement: "REPLACE".to_string()
        }]
    );
}
