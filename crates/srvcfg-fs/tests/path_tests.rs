use srvcfg_fs::NormalizedPath;
use rstest::rstest;

#[test]
fn test_normalize_backslashes_to_forward() {
    let path = NormalizedPath::new("usr\\servers\\app");
    assert_eq!(path.as_str(), "usr/servers/app");
}

#[test]
fn test_join_paths() {
    let base = NormalizedPath::new("/wlp/usr/servers/app");
    let joined = base.join("configDropins/defaults");
    assert_eq!(joined.as_str(), "/wlp/usr/servers/app/configDropins/defaults");
}

#[test]
fn test_parent() {
    let path = NormalizedPath::new("/wlp/usr/servers/app/server.xml");
    let parent = path.parent().unwrap();
    assert_eq!(parent.as_str(), "/wlp/usr/servers/app");
}

#[test]
fn test_file_name_and_extension() {
    let path = NormalizedPath::new("/wlp/usr/servers/app/server.xml");
    assert_eq!(path.file_name(), Some("server.xml"));
    assert_eq!(path.extension(), Some("xml"));
    assert_eq!(NormalizedPath::new("/a/.hidden").extension(), None);
}

#[rstest]
#[case("a/../b", "b")]
#[case("../a", "a")]
#[case("/a/b/../../c", "/c")]
#[case("a\\..\\b", "b")]
#[case("a/./b//c", "a/b/c")]
#[case("/srv/app/./includes/../shared.xml", "/srv/app/shared.xml")]
fn test_dot_segments_are_collapsed(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(input).as_str(), expected);
}

#[rstest]
#[case("/srv/app", "inc/a.xml", "/srv/app/inc/a.xml")]
#[case("/srv/app", "../shared/a.xml", "/srv/shared/a.xml")]
#[case("/srv/app", "/etc/a.xml", "/etc/a.xml")]
#[case("/srv/app", "D:\\cfg\\a.xml", "D:/cfg/a.xml")]
fn test_include_style_joins(#[case] base: &str, #[case] segment: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(base).join(segment).as_str(), expected);
}

#[test]
fn test_equal_spellings_compare_equal() {
    assert_eq!(
        NormalizedPath::new("/srv/app/../app/server.xml"),
        NormalizedPath::new("/srv//app/server.xml")
    );
}
