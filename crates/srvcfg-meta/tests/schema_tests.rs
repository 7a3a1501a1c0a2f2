use pretty_assertions::assert_eq;
use rstest::rstest;
use srvcfg_fs::NormalizedPath;
use srvcfg_meta::{AttributeType, ElementKind, SchemaLoader, SchemaMetadata};
use std::fs;
use tempfile::TempDir;

#[rstest]
#[case("server", ElementKind::Singleton)]
#[case("featureManager", ElementKind::Singleton)]
#[case("logging", ElementKind::Singleton)]
#[case("dataSource", ElementKind::KeyedFactory)]
#[case("keyStore", ElementKind::KeyedFactory)]
#[case("include", ElementKind::UnkeyedFactory)]
#[case("variable", ElementKind::UnkeyedFactory)]
fn test_builtin_classification(#[case] name: &str, #[case] expected: ElementKind) {
    assert_eq!(SchemaMetadata::with_builtins().classify(name), Some(expected));
}

#[test]
fn test_load_toml_schema_extends_builtins() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("schema.toml");
    fs::write(
        &path,
        r#"
[[element]]
name = "customLogin"
kind = "singleton"
features = ["appSecurity"]

[element.attributes]
realm = "string"
timeout = "union(duration, enum(-1))"
"#,
    )
    .unwrap();

    let schema = SchemaLoader::new()
        .load_with_builtins(&NormalizedPath::new(&path))
        .unwrap();
    let custom = schema.element("customLogin").unwrap();
    assert_eq!(custom.kind, ElementKind::Singleton);
    assert_eq!(custom.features, vec!["appSecurity"]);
    assert_eq!(
        schema.attribute_type("customLogin", "timeout"),
        Some(&AttributeType::Union(vec![
            AttributeType::Duration,
            AttributeType::Enum(vec!["-1".into()]),
        ]))
    );
    assert!(schema.classify("httpEndpoint").is_some());
}

#[test]
fn test_load_json_schema() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("schema.json");
    fs::write(
        &path,
        r#"{"element": [{"name": "cache", "kind": "keyed-factory", "attributes": {"size": "int"}}]}"#,
    )
    .unwrap();

    let elements = SchemaLoader::new()
        .load_file(&NormalizedPath::new(&path))
        .unwrap();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].kind, ElementKind::KeyedFactory);
    assert_eq!(elements[0].attributes["size"], AttributeType::Int);
}

#[test]
fn test_invalid_attribute_type_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("schema.toml");
    fs::write(
        &path,
        "[[element]]\nname = \"x\"\nkind = \"singleton\"\n[element.attributes]\na = \"float\"\n",
    )
    .unwrap();

    assert!(SchemaLoader::new()
        .load_file(&NormalizedPath::new(&path))
        .is_err());
}
