use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use srvcfg_core::{DEFAULT_THRESHOLD, best_match, similarity};

const NONE: &[&str] = &[];

#[rstest]
#[case(&["cookieGroup", "cookieStore", "cookieChain"], "cookieStar", NONE, Some("cookieStore"))]
#[case(
    &["cookieCart", "cookieData", "cookieFat", "cookieFare"],
    "cookieHat",
    NONE,
    Some("cookieCart,cookieData,cookieFat")
)]
#[case(
    &["cookieCat", "cookieFat", "cookieMat"],
    "cookieBat",
    &["cookieFat"],
    Some("cookieCat,cookieMat")
)]
#[case(&["keyStore", "trustStore"], "applicationManager", NONE, None)]
fn best_match_vectors(
    #[case] candidates: &[&str],
    #[case] target: &str,
    #[case] exclude: &[&str],
    #[case] expected: Option<&str>,
) {
    assert_eq!(
        best_match(candidates, target, exclude, DEFAULT_THRESHOLD).as_deref(),
        expected
    );
}

#[test]
fn candidates_containing_the_target_tie_with_it() {
    assert_eq!(
        best_match(&["maxFile", "maxFiles", "maxFilesize"], "maxFiles", NONE, 70).as_deref(),
        Some("maxFiles,maxFilesize")
    );
    assert_eq!(similarity("maxFiles", "maxFiles"), 100);
}

proptest! {
    #[test]
    fn results_are_stable_and_drawn_from_candidates(
        candidates in prop::collection::vec("[a-zA-Z]{1,12}", 0..8),
        target in "[a-zA-Z]{1,12}",
        threshold in 0u8..=100,
    ) {
        let first = best_match(&candidates, &target, NONE, threshold);
        let second = best_match(&candidates, &target, NONE, threshold);
        prop_assert_eq!(&first, &second);

        if let Some(found) = first {
            for name in found.split(',') {
                prop_assert!(candidates.iter().any(|c| c == name));
                prop_assert!(similarity(&target, name) >= threshold);
            }
        }
    }

    #[test]
    fn a_candidate_equal_to_the_target_is_always_returned(
        target in "[a-z]{1,12}",
        others in prop::collection::vec("[a-z]{1,12}", 0..6),
    ) {
        let mut candidates = others;
        candidates.push(target.clone());

        let found = best_match(&candidates, &target, NONE, 100).unwrap_or_default();
        prop_assert!(found.split(',').any(|name| name == target));
    }

    #[test]
    fn excluded_names_never_appear(
        candidates in prop::collection::vec("[a-z]{1,8}", 1..8),
        target in "[a-z]{1,8}",
    ) {
        let excluded = vec![candidates[0].clone()];
        if let Some(found) = best_match(&candidates, &target, &excluded, 0) {
            prop_assert!(found.split(',').all(|name| name != excluded[0]));
        }
    }
}
