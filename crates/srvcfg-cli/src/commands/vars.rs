//! Vars command implementation

use colored::Colorize;
use serde::Serialize;
use srvcfg_core::{ResolvedConfiguration, Tier};
use srvcfg_fs::NormalizedPath;

use crate::context::ServerContext;
use crate::error::Result;

/// Effective value of one variable and the declaration it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableRow {
    pub name: String,
    pub value: String,
    /// Value after `${...}` expansion, when it differs and succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<NormalizedPath>,
    pub line: u32,
    /// Number of declarations of this name
    pub declarations: usize,
}

/// Run the vars command
pub fn run_vars(context: &ServerContext, json: bool) -> Result<()> {
    let config = context.resolve()?;
    let rows = variable_rows(&config);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{} {} variables for {}",
        "=>".blue().bold(),
        rows.len(),
        config.root
    );
    for row in &rows {
        let origin = match &row.file {
            Some(file) => format!("{}, {}:{}", row.tier, file, row.line),
            None => row.tier.to_string(),
        };
        match &row.resolved {
            Some(resolved) => println!(
                "   {} = {} -> {} {}",
                row.name.cyan(),
                row.value,
                resolved,
                format!("({origin})").dimmed()
            ),
            None => println!(
                "   {} = {} {}",
                row.name.cyan(),
                row.value,
                format!("({origin})").dimmed()
            ),
        }
    }
    Ok(())
}

/// Rows for every variable with an effective value, sorted by name.
pub fn variable_rows(config: &ResolvedConfiguration) -> Vec<VariableRow> {
    let resolver = config.resolver();
    config
        .variables
        .names()
        .filter_map(|name| {
            let winner = config.variables.winner(name)?;
            let value = config.variables.effective(name)?.to_string();
            let resolution = resolver.resolve(&value);
            let resolved = (resolution.is_ok() && resolution.value != value).then_some(resolution.value);
            Some(VariableRow {
                name: name.to_string(),
                value,
                resolved,
                tier: winner.tier,
                file: winner.file.clone(),
                line: winner.line,
                declarations: config.variables.declarations(name).len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use srvcfg_core::ConfigEngine;
    use srvcfg_meta::{SchemaMetadata, ValidationSettings};
    use srvcfg_test_utils::MemoryServer;

    fn resolve(server: &MemoryServer) -> ResolvedConfiguration {
        let engine = ConfigEngine::new(SchemaMetadata::with_builtins(), ValidationSettings::default());
        engine.resolve(&server.layout, server.provider.as_ref()).unwrap()
    }

    #[test]
    fn override_dropin_wins_and_is_attributed() {
        let server = MemoryServer::new()
            .with_server_xml(r#"  <variable name="port" value="9080"/>"#)
            .with_config(
                "configDropins/overrides/port.xml",
                r#"  <variable name="port" value="9443"/>"#,
            );

        let rows = variable_rows(&resolve(&server));
        let port = rows.iter().find(|r| r.name == "port").unwrap();
        assert_eq!(port.value, "9443");
        assert_eq!(port.tier, Tier::OverrideDropins);
        assert_eq!(port.file, Some(server.path("configDropins/overrides/port.xml")));
        assert_eq!(port.line, 3);
        assert_eq!(port.declarations, 2);
    }

    #[test]
    fn expanded_values_are_reported() {
        let server = MemoryServer::new().with_server_xml(
            r#"  <variable name="base" value="9000"/>
  <variable name="port" value="${base+80}"/>"#,
        );

        let rows = variable_rows(&resolve(&server));
        let port = rows.iter().find(|r| r.name == "port").unwrap();
        assert_eq!(port.value, "${base+80}");
        assert_eq!(port.resolved.as_deref(), Some("9080"));

        let base = rows.iter().find(|r| r.name == "base").unwrap();
        assert_eq!(base.resolved, None);
    }

    #[test]
    fn predefined_locations_are_listed() {
        let server = MemoryServer::new().with_server_xml("");
        let rows = variable_rows(&resolve(&server));
        let config_dir = rows.iter().find(|r| r.name == "server.config.dir").unwrap();
        assert_eq!(config_dir.tier, Tier::Builtin);
        assert!(config_dir.file.is_none());
    }
}
