use serde::Deserialize;
use srvcfg_fs::{ConfigStore, Error, NormalizedPath};
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Deserialize, PartialEq)]
struct TestSettings {
    threshold: u32,
    ignore: Vec<String>,
}

#[test]
fn test_load_toml() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("settings.toml");
    fs::write(&file_path, "threshold = 70\nignore = [\"a\"]\n").unwrap();

    let settings: TestSettings = ConfigStore::new()
        .load(&NormalizedPath::new(&file_path))
        .unwrap();
    assert_eq!(settings.threshold, 70);
    assert_eq!(settings.ignore, vec!["a"]);
}

#[test]
fn test_load_json_and_yaml() {
    let temp = TempDir::new().unwrap();
    let json = temp.path().join("settings.json");
    let yaml = temp.path().join("settings.yml");
    fs::write(&json, r#"{"threshold": 50, "ignore": []}"#).unwrap();
    fs::write(&yaml, "threshold: 60\nignore: [b]\n").unwrap();

    let store = ConfigStore::new();
    let from_json: TestSettings = store.load(&NormalizedPath::new(&json)).unwrap();
    let from_yaml: TestSettings = store.load(&NormalizedPath::new(&yaml)).unwrap();
    assert_eq!(from_json.threshold, 50);
    assert_eq!(from_yaml.ignore, vec!["b"]);
}

#[test]
fn test_unsupported_extension() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("settings.ini");
    fs::write(&file_path, "threshold=1").unwrap();

    let result: Result<TestSettings, _> = ConfigStore::new().load(&NormalizedPath::new(&file_path));
    assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
}

#[test]
fn test_load_optional_missing_is_none() {
    let temp = TempDir::new().unwrap();
    let loaded: Option<TestSettings> = ConfigStore::new()
        .load_optional(&NormalizedPath::new(temp.path().join("absent.toml")))
        .unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_parse_error_names_format() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("settings.toml");
    fs::write(&file_path, "threshold = [").unwrap();

    let err = ConfigStore::new()
        .load::<TestSettings>(&NormalizedPath::new(&file_path))
        .unwrap_err();
    assert!(err.to_string().contains("TOML"));
}
