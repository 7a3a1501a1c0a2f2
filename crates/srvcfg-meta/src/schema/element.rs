//! Element schema entries
//!
//! # Example TOML
//!
//! ```toml
//! [[element]]
//! name = "httpEndpoint"
//! kind = "keyed-factory"
//!
//! [element.attributes]
//! httpPort = "int"
//! enabled = "boolean"
//! sslOptionsRef = "reference(sslOptions)"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AttributeType, ElementKind};

/// Schema entry for one configuration element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSchema {
    /// Element name as written in XML (e.g. "httpEndpoint")
    pub name: String,

    /// Merge classification
    pub kind: ElementKind,

    /// Declared attribute types, keyed by attribute name
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeType>,

    /// Features enabling this element; empty means always available.
    ///
    /// Entries are short names (`jdbc`) matching any version of the
    /// feature (`jdbc-4.2`), or full feature names.
    #[serde(default)]
    pub features: Vec<String>,

    /// Accepts attributes not listed in `attributes`
    #[serde(default)]
    pub open: bool,
}

impl ElementSchema {
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: BTreeMap::new(),
            features: Vec::new(),
            open: false,
        }
    }

    /// Builder: declare an attribute.
    pub fn attribute(mut self, name: impl Into<String>, ty: AttributeType) -> Self {
        self.attributes.insert(name.into(), ty);
        self
    }

    /// Builder: require one of the given features.
    pub fn requires(mut self, features: &[&str]) -> Self {
        self.features = features.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Builder: accept arbitrary attributes.
    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }

    /// Whether the element is available given the enabled feature names.
    pub fn is_available<S: AsRef<str>>(&self, enabled: &[S]) -> bool {
        if self.features.is_empty() {
            return true;
        }
        self.features.iter().any(|required| {
            enabled
                .iter()
                .any(|feature| feature_matches(required, feature.as_ref()))
        })
    }
}

/// `jdbc` matches `jdbc-4.2`; full names must match exactly. Case-insensitive.
fn feature_matches(required: &str, enabled: &str) -> bool {
    let required = required.to_lowercase();
    let enabled = enabled.trim().to_lowercase();
    if required == enabled {
        return true;
    }
    match enabled.rsplit_once('-') {
        Some((short, _version)) => short == required,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_without_features_is_always_available() {
        let schema = ElementSchema::new("logging", ElementKind::Singleton);
        assert!(schema.is_available::<&str>(&[]));
    }

    #[test]
    fn short_feature_name_matches_any_version() {
        let schema = ElementSchema::new("dataSource", ElementKind::KeyedFactory).requires(&["jdbc"]);
        assert!(schema.is_available(&["servlet-4.0", "JDBC-4.2"]));
        assert!(!schema.is_available(&["servlet-4.0"]));
        assert!(!schema.is_available(&["jdbcx-1.0"]));
    }

    #[test]
    fn parses_from_toml() {
        let toml_src = r#"
name = "httpEndpoint"
kind = "keyed-factory"

[attributes]
httpPort = "int"
sslOptionsRef = "reference(sslOptions)"
"#;
        let schema: ElementSchema = toml::from_str(toml_src).unwrap();
        assert_eq!(schema.kind, ElementKind::KeyedFactory);
        assert_eq!(schema.attributes["httpPort"], AttributeType::Int);
        assert_eq!(
            schema.attributes["sslOptionsRef"],
            AttributeType::Reference("sslOptions".into())
        );
        assert!(!schema.open);
    }
}
