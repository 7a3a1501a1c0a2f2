//! Dump command implementation

use colored::Colorize;
use srvcfg_core::LogicalElement;

use crate::context::ServerContext;
use crate::error::Result;

/// Run the dump command
pub fn run_dump(context: &ServerContext, json: bool) -> Result<()> {
    let config = context.resolve()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config.elements)?);
        return Ok(());
    }

    println!("{} Merged configuration for {}", "=>".blue().bold(), config.root);
    print!("{}", render_tree(&config.elements));
    Ok(())
}

/// One line per element, children indented under their parent.
pub fn render_tree(elements: &[LogicalElement]) -> String {
    let mut out = String::new();
    for element in elements {
        render_element(element, 0, &mut out);
    }
    out
}

fn render_element(element: &LogicalElement, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth + 1);
    out.push_str(&indent);
    out.push_str(&element.display_name().cyan().to_string());
    for attribute in &element.attributes {
        if attribute.name == "id" {
            continue;
        }
        out.push_str(&format!(" {}=\"{}\"", attribute.name, attribute.value));
    }
    if let Some(text) = element.text.as_deref().filter(|t| !t.is_empty()) {
        out.push_str(&format!(" = {text}"));
    }
    out.push_str(&format!(
        "  {}\n",
        format!("({}:{})", element.location.file, element.location.line).dimmed()
    ));
    for child in &element.children {
        render_element(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use srvcfg_core::ConfigEngine;
    use srvcfg_meta::{SchemaMetadata, ValidationSettings};
    use srvcfg_test_utils::MemoryServer;

    #[test]
    fn nested_elements_are_indented() {
        colored::control::set_override(false);
        let server = MemoryServer::new().with_server_xml(
            r#"  <httpEndpoint id="web" httpPort="9080">
    <tcpOptions soReuseAddr="true"/>
  </httpEndpoint>
  <featureManager>
    <feature>servlet-6.0</feature>
  </featureManager>"#,
        );
        let engine = ConfigEngine::new(SchemaMetadata::with_builtins(), ValidationSettings::default());
        let config = engine.resolve(&server.layout, server.provider.as_ref()).unwrap();

        let rendered = render_tree(&config.elements);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].starts_with("  httpEndpoint[web] httpPort=\"9080\""));
        assert!(lines[1].starts_with("    tcpOptions"));
        assert!(lines[1].contains("soReuseAddr=\"true\""));
        assert!(lines[2].starts_with("  featureManager"));
        assert!(lines[3].starts_with("    feature = servlet-6.0"));
    }
}
