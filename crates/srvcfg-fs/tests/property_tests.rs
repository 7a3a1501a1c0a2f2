use proptest::prelude::*;
use srvcfg_fs::NormalizedPath;

fn raw_path() -> impl Strategy<Value = String> {
    "[a-z0-9_./\\\\-]{0,40}"
}

proptest! {
    #[test]
    fn normalizing_twice_changes_nothing(raw in raw_path()) {
        let once = NormalizedPath::new(&raw);
        let twice = NormalizedPath::new(once.as_str());
        prop_assert_eq!(&once, &twice);

        let text = once.as_str();
        prop_assert!(!text.contains('\\'));
        prop_assert!(!text.split('/').skip(1).any(|s| s == "." || s == ".."));
    }

    #[test]
    fn include_locations_resolve_below_their_directory(location in "[a-z]{1,8}(/[a-z]{1,8}){0,3}\\.xml") {
        let dir = NormalizedPath::new("/wlp/usr/servers/app");
        let resolved = dir.join(&location);
        prop_assert!(resolved.starts_with(&dir));
        prop_assert_eq!(resolved.extension(), Some("xml"));
    }

    #[test]
    fn parent_of_join_is_the_base(base in "/[a-z]{1,8}(/[a-z]{1,8}){0,3}", name in "[a-z]{1,8}") {
        let dir = NormalizedPath::new(&base);
        let child = dir.join(&name);
        prop_assert_eq!(child.parent(), Some(dir));
        prop_assert_eq!(child.file_name(), Some(name.as_str()));
    }
}
